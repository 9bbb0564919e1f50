use diesel::prelude::*;
use diesel::SqliteConnection;
use serde::Serialize;

use crate::models::{NewClass, NewClassCar, NewClassDriver};
use crate::schema::{class_cars, class_drivers, classes};

#[derive(Queryable, Serialize, Identifiable, PartialEq, Eq, Debug, Clone)]
#[diesel(table_name = classes)]
pub struct Class {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub active: bool,
}

impl Class {
    /// every class ordered by id
    pub fn get_all(conn: &mut SqliteConnection) -> QueryResult<Vec<Class>> {
        use crate::schema::classes::dsl::*;

        classes.order(id).load::<Class>(conn)
    }

    pub fn get_by_slug(conn: &mut SqliteConnection, slug_in: &str) -> QueryResult<Option<Class>> {
        use crate::schema::classes::dsl::*;

        classes.filter(slug.eq(slug_in)).first::<Class>(conn).optional()
    }

    /// insert the class unless one with the same name or slug exists
    pub fn insert_or_ignore(conn: &mut SqliteConnection, new_class: &NewClass) -> QueryResult<usize> {
        diesel::insert_or_ignore_into(classes::table)
            .values(new_class)
            .execute(conn)
    }

    pub fn car_memberships(conn: &mut SqliteConnection) -> QueryResult<Vec<NewClassCar>> {
        class_cars::table
            .select((class_cars::class_id, class_cars::car_id))
            .order((class_cars::class_id, class_cars::car_id))
            .load::<NewClassCar>(conn)
    }

    pub fn driver_memberships(conn: &mut SqliteConnection) -> QueryResult<Vec<NewClassDriver>> {
        class_drivers::table
            .select((class_drivers::class_id, class_drivers::user_name))
            .order((class_drivers::class_id, class_drivers::user_name))
            .load::<NewClassDriver>(conn)
    }

    /// add cars to a class, memberships that already exist are kept
    pub fn add_cars(conn: &mut SqliteConnection, memberships: &[NewClassCar]) -> QueryResult<usize> {
        let mut inserted = 0;
        for membership in memberships {
            inserted += diesel::insert_or_ignore_into(class_cars::table)
                .values(membership)
                .execute(conn)?;
        }
        Ok(inserted)
    }

    pub fn add_drivers(conn: &mut SqliteConnection, memberships: &[NewClassDriver]) -> QueryResult<usize> {
        let mut inserted = 0;
        for membership in memberships {
            inserted += diesel::insert_or_ignore_into(class_drivers::table)
                .values(membership)
                .execute(conn)?;
        }
        Ok(inserted)
    }
}
