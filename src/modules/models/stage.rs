use chrono::{Duration, NaiveDateTime};
use diesel::prelude::*;
use diesel::SqliteConnection;
use serde::Serialize;

use crate::models::NewRallyStage;
use crate::modules::helpers::duration::from_seconds;
use crate::schema::rally_stages;

#[derive(Queryable, Serialize, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = rally_stages)]
pub struct RallyStage {
    pub id: i32,
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

impl RallyStage {
    /// stage time including both penalties
    pub fn total_time(&self) -> Duration {
        from_seconds(self.time3 + self.penalty + self.service_penalty)
    }

    pub fn total_penalty(&self) -> f64 {
        self.penalty + self.service_penalty
    }

    pub fn insert_batch(conn: &mut SqliteConnection, rows: &[NewRallyStage]) -> QueryResult<usize> {
        diesel::insert_into(rally_stages::table)
            .values(rows)
            .execute(conn)
    }

    /// stage rows of one rally, ordered by stage and then insertion order
    pub fn from_rally(conn: &mut SqliteConnection, rally_id_in: i64) -> QueryResult<Vec<RallyStage>> {
        use crate::schema::rally_stages::dsl::*;

        rally_stages
            .filter(rally_id.eq(rally_id_in))
            .order((stage_num, id))
            .load::<RallyStage>(conn)
    }

    pub fn get_all(conn: &mut SqliteConnection) -> QueryResult<Vec<RallyStage>> {
        use crate::schema::rally_stages::dsl::*;

        rally_stages
            .order((rally_id, stage_num, id))
            .load::<RallyStage>(conn)
    }
}
