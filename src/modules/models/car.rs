use diesel::prelude::*;
use diesel::SqliteConnection;
use serde::Serialize;

use crate::models::NewCar;
use crate::schema::cars;

#[derive(Queryable, Serialize, Identifiable, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = cars)]
pub struct Car {
    pub id: i32,
    pub rsf_id: i64,
    pub slug: String,
    pub brand: String,
    pub model: String,
    pub category: String,
}

impl Car {
    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {
        cars::table.count().get_result(conn)
    }

    pub fn insert_batch(conn: &mut SqliteConnection, new_cars: &[NewCar]) -> QueryResult<usize> {
        diesel::insert_into(cars::table)
            .values(new_cars)
            .execute(conn)
    }

    pub fn get_all(conn: &mut SqliteConnection) -> QueryResult<Vec<Car>> {
        use crate::schema::cars::dsl::*;

        cars.order(id).load::<Car>(conn)
    }
}
