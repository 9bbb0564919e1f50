pub mod catalog;
pub mod config;
pub mod ingest;
pub mod rally_api;

pub mod models {
    pub mod car;
    pub mod class;
    pub mod overall;
    pub mod rally;
    pub mod stage;

    pub mod general;
}

pub mod standings {
    pub mod points;
    pub mod ranking;
    pub mod season;
    pub mod stats;
}

pub mod reports;

pub mod helpers {
    pub mod duration;
    pub mod parse;

    pub mod math;
    pub mod general;
    pub mod logging;

    pub mod handelbars {
        pub mod params;
        pub mod format_duration;
        pub mod format_float;
    }
}
