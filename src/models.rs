use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::*;


#[derive(Insertable, Serialize, Debug, Clone, Deserialize, PartialEq)]
#[diesel(table_name = rallies)]
pub struct NewRally {
    pub rally_id: i64,
    pub name: String,
    pub description: String,
    pub creator: String,
    pub damage_level: String,
    pub number_of_legs: i32,
    pub super_rally: bool,
    pub pacenotes_options: String,
    pub started: i64,
    pub finished: i64,
    pub total_distance: f64,
    pub car_groups: String,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
}

#[derive(Insertable, Serialize, Debug, Clone, Deserialize, PartialEq)]
#[diesel(table_name = rally_overalls)]
pub struct NewRallyOverall {
    pub rally_id: i64,
    pub user_id: i64,
    /// finishing position, `None` when the driver did not finish
    pub position: Option<i32>,
    pub user_name: String,
    pub real_name: String,
    pub nationality: String,
    pub car: String,
    pub car_id: i32,
    pub time3_ns: i64,
    pub super_rally: i64,
    pub penalty: f64,
}

#[derive(Insertable, Serialize, Debug, Clone, Deserialize, PartialEq)]
#[diesel(table_name = rally_stages)]
pub struct NewRallyStage {
    pub rally_id: i64,
    pub stage_num: i32,
    pub stage_name: String,
    pub nationality: String,
    pub user_name: String,
    pub real_name: String,
    pub car_group: String,
    pub car_name: String,
    pub time1: f64,
    pub time2: f64,
    pub time3: f64,
    pub finish_real_time: Option<NaiveDateTime>,
    pub penalty: f64,
    pub service_penalty: f64,
    pub super_rally: bool,
    pub progress: String,
    pub comments: String,
}

#[derive(Insertable, Serialize, Debug, Clone, Deserialize, PartialEq)]
#[diesel(table_name = cars)]
pub struct NewCar {
    pub rsf_id: i64,
    pub slug: String,
    pub brand: String,
    pub model: String,
    pub category: String,
}

#[derive(Insertable, Serialize, Debug, Clone, Deserialize, PartialEq, Eq, Hash)]
#[diesel(table_name = classes)]
pub struct NewClass {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub active: bool,
}

#[derive(Insertable, Queryable, Serialize, Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
#[diesel(table_name = class_cars)]
pub struct NewClassCar {
    pub class_id: i32,
    pub car_id: i32,
}

#[derive(Insertable, Queryable, Serialize, Debug, Clone, Deserialize, PartialEq, Eq, Hash)]
#[diesel(table_name = class_drivers)]
pub struct NewClassDriver {
    pub class_id: i32,
    pub user_name: String,
}
