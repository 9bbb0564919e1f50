use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::{select, SqliteConnection};
use log::error;
use serde::Serialize;

use crate::macros::database_error_handeler::db_handle_get_error;
use crate::models::NewRally;
use crate::modules::helpers::general::Helpers;
use crate::schema::{rallies, rally_overalls, rally_stages};

#[derive(Queryable, Serialize, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = rallies)]
pub struct Rally {
    pub id: i32,
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

impl Rally {
    /// # create rally
    /// insert the rally description. fails when the rally id is already stored.
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `new_rally` - the rally description to store
    ///
    /// ## Returns
    /// * `Rally` - the stored rally
    pub fn new(conn: &mut SqliteConnection, new_rally: &NewRally) -> QueryResult<Rally> {
        diesel::insert_into(rallies::table)
            .values(new_rally)
            .get_result(conn)
    }

    /// # check if exists
    /// check if a rally with the given external id is stored
    pub fn exists(conn: &mut SqliteConnection, rally_id_in: i64) -> QueryResult<bool> {
        use crate::schema::rallies::dsl::*;

        select(exists(rallies.filter(rally_id.eq(rally_id_in)))).get_result(conn)
    }

    pub fn get_by_rally_id(conn: &mut SqliteConnection, rally_id_in: i64) -> QueryResult<Rally> {
        use crate::schema::rallies::dsl::*;

        let rally = db_handle_get_error!(
            rallies.filter(rally_id.eq(rally_id_in)).first::<Rally>(conn),
            "models/rally:get_by_rally_id",
            "rally"
        );

        Ok(rally)
    }

    /// every stored rally, ordered by rally id
    pub fn get_all(conn: &mut SqliteConnection) -> QueryResult<Vec<Rally>> {
        use crate::schema::rallies::dsl::*;

        rallies.order(rally_id).load::<Rally>(conn)
    }

    /// # delete rally
    /// delete the rally together with its overall and stage rows.
    /// callers that need all-or-nothing behaviour run this inside a transaction.
    ///
    /// ## Returns
    /// * `usize` - the number of rally rows removed (0 or 1)
    pub fn delete_with_results(conn: &mut SqliteConnection, rally_id_in: i64) -> QueryResult<usize> {
        diesel::delete(rally_overalls::table.filter(rally_overalls::rally_id.eq(rally_id_in)))
            .execute(conn)?;
        diesel::delete(rally_stages::table.filter(rally_stages::rally_id.eq(rally_id_in)))
            .execute(conn)?;
        diesel::delete(rallies::table.filter(rallies::rally_id.eq(rally_id_in))).execute(conn)
    }

    pub fn car_group_list(&self) -> Vec<String> {
        Helpers::split_list(&self.car_groups)
    }
}
