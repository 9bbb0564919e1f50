use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use diesel::prelude::*;
use diesel::SqliteConnection;
use log::info;
use serde::Deserialize;
use snafu::ResultExt;

use crate::errors::{CatalogParseSnafu, CustomResult, Error, FileSnafu, InvalidCatalogSnafu};
use crate::models::{NewCar, NewClass, NewClassCar, NewClassDriver};
use crate::modules::config::{ClassAxis, ClassConfig};
use crate::modules::helpers::general::Helpers;
use crate::modules::models::car::Car;
use crate::modules::models::class::Class;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    cars: Vec<CatalogCar>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CatalogCar {
    #[serde(rename = "RSFID")]
    rsf_id: i64,
    brand: String,
    model: String,
    category: String,
}

/// # parse car catalog
/// decode the static catalog and slug every car from brand and model
///
/// ## Returns
/// * `Vec<NewCar>` - the cars, or `InvalidCatalogError` when a car has no usable slug
pub fn parse_cars(content: &str, path: &Path) -> CustomResult<Vec<NewCar>> {
    let file: CatalogFile = serde_json::from_str(content).context(CatalogParseSnafu { path })?;

    file.cars
        .into_iter()
        .map(|car| {
            let slug = Helpers::slugify(&format!("{} {}", car.brand, car.model));
            if slug.is_empty() {
                return InvalidCatalogSnafu {
                    message: format!("car slug is empty for car: {} {}", car.brand, car.model),
                }
                .fail();
            }

            Ok(NewCar {
                rsf_id: car.rsf_id,
                slug,
                brand: car.brand,
                model: car.model,
                category: car.category,
            })
        })
        .collect()
}

pub fn load_cars(path: &Path) -> CustomResult<Vec<NewCar>> {
    let content = fs::read_to_string(path).context(FileSnafu { path })?;
    parse_cars(&content, path)
}

/// what the store holds before seeding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub cars: Vec<Car>,
    pub classes: Vec<Class>,
    pub class_cars: Vec<NewClassCar>,
    pub class_drivers: Vec<NewClassDriver>,
}

impl CatalogSnapshot {
    pub fn load(conn: &mut SqliteConnection) -> QueryResult<CatalogSnapshot> {
        Ok(CatalogSnapshot {
            cars: Car::get_all(conn)?,
            classes: Class::get_all(conn)?,
            class_cars: Class::car_memberships(conn)?,
            class_drivers: Class::driver_memberships(conn)?,
        })
    }
}

/// what seeding still has to add. memberships name their class by slug
/// because new classes have no id yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogDelta {
    pub classes: Vec<NewClass>,
    pub class_cars: Vec<(String, i32)>,
    pub class_drivers: Vec<(String, String)>,
}

impl CatalogDelta {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.class_cars.is_empty() && self.class_drivers.is_empty()
    }
}

struct Planner<'a> {
    snapshot: &'a CatalogSnapshot,
    class_ids: HashMap<&'a str, i32>,
    existing_cars: HashSet<(i32, i32)>,
    existing_drivers: HashSet<(i32, String)>,
    planned_classes: HashSet<String>,
    delta: CatalogDelta,
}

impl<'a> Planner<'a> {
    fn new(snapshot: &'a CatalogSnapshot) -> Planner<'a> {
        Planner {
            snapshot,
            class_ids: snapshot.classes.iter().map(|class| (class.slug.as_str(), class.id)).collect(),
            existing_cars: snapshot.class_cars.iter().map(|entry| (entry.class_id, entry.car_id)).collect(),
            existing_drivers: snapshot
                .class_drivers
                .iter()
                .map(|entry| (entry.class_id, entry.user_name.clone()))
                .collect(),
            planned_classes: HashSet::new(),
            delta: CatalogDelta::default(),
        }
    }

    fn class(&mut self, name: &str, description: &str) -> String {
        let slug = Helpers::slugify(name);
        if !self.class_ids.contains_key(slug.as_str()) && self.planned_classes.insert(slug.clone()) {
            self.delta.classes.push(NewClass {
                name: name.to_string(),
                slug: slug.clone(),
                description: description.to_string(),
                active: true,
            });
        }
        slug
    }

    fn car(&mut self, slug: &str, car_id: i32) {
        let exists = self
            .class_ids
            .get(slug)
            .is_some_and(|class_id| self.existing_cars.contains(&(*class_id, car_id)));
        let entry = (slug.to_string(), car_id);
        if !exists && !self.delta.class_cars.contains(&entry) {
            self.delta.class_cars.push(entry);
        }
    }

    fn driver(&mut self, slug: &str, user_name: &str) {
        let exists = self
            .class_ids
            .get(slug)
            .is_some_and(|class_id| self.existing_drivers.contains(&(*class_id, user_name.to_string())));
        let entry = (slug.to_string(), user_name.to_string());
        if !exists && !self.delta.class_drivers.contains(&entry) {
            self.delta.class_drivers.push(entry);
        }
    }

    fn cars_in(&self, category: &str) -> Vec<i32> {
        self.snapshot
            .cars
            .iter()
            .filter(|car| car.category == category)
            .map(|car| car.id)
            .collect()
    }
}

/// # plan catalog
/// work out which classes and memberships are missing. every car category
/// is a class of its own, configured classes come on top of those.
///
/// ## Arguments
/// * `snapshot` - the current store content
/// * `configured` - the classes from the settings file
/// * `axis` - whether configured classes group cars or drivers
///
/// ## Returns
/// * `CatalogDelta` - empty when the store is already up to date
pub fn plan_catalog(snapshot: &CatalogSnapshot, configured: &[ClassConfig], axis: ClassAxis) -> CatalogDelta {
    let mut planner = Planner::new(snapshot);

    for car in &snapshot.cars {
        let slug = planner.class(&car.category, "");
        planner.car(&slug, car.id);
    }

    for class in configured {
        let slug = planner.class(&class.name, &class.description);
        match axis {
            ClassAxis::Car => {
                for category in &class.categories {
                    for car_id in planner.cars_in(category) {
                        planner.car(&slug, car_id);
                    }
                }
            }
            ClassAxis::Driver => {
                for user_name in &class.drivers {
                    planner.driver(&slug, user_name.trim());
                }
            }
        }
    }

    planner.delta
}

/// # apply catalog
/// write a planned delta. everything is insert-or-ignore so applying the
/// same delta twice is harmless.
pub fn apply_catalog(conn: &mut SqliteConnection, delta: &CatalogDelta) -> CustomResult<()> {
    conn.transaction::<_, Error, _>(|conn| {
        for class in &delta.classes {
            Class::insert_or_ignore(conn, class)?;
        }

        let class_ids: HashMap<String, i32> = Class::get_all(conn)?
            .into_iter()
            .map(|class| (class.slug, class.id))
            .collect();
        let class_id = |slug: &str| -> CustomResult<i32> {
            match class_ids.get(slug) {
                Some(id) => Ok(*id),
                None => InvalidCatalogSnafu {
                    message: format!("class {slug} is missing after seeding"),
                }
                .fail(),
            }
        };

        let cars = delta
            .class_cars
            .iter()
            .map(|(slug, car_id)| Ok(NewClassCar { class_id: class_id(slug)?, car_id: *car_id }))
            .collect::<CustomResult<Vec<_>>>()?;
        let drivers = delta
            .class_drivers
            .iter()
            .map(|(slug, user_name)| {
                Ok(NewClassDriver {
                    class_id: class_id(slug)?,
                    user_name: user_name.clone(),
                })
            })
            .collect::<CustomResult<Vec<_>>>()?;

        Class::add_cars(conn, &cars)?;
        Class::add_drivers(conn, &drivers)?;
        Ok(())
    })
}

/// # seed catalog
/// fill an empty car table from `cars`, then bring classes and memberships
/// up to date with the configuration
///
/// ## Returns
/// * `CatalogDelta` - what was added
pub fn seed_catalog(
    conn: &mut SqliteConnection,
    cars: impl FnOnce() -> CustomResult<Vec<NewCar>>,
    configured: &[ClassConfig],
    axis: ClassAxis,
) -> CustomResult<CatalogDelta> {
    if Car::count(conn)? == 0 {
        let new_cars = cars()?;
        Car::insert_batch(conn, &new_cars)?;
        info!(target: "catalog:seed_catalog", "seeded {} cars", new_cars.len());
    }

    let snapshot = CatalogSnapshot::load(conn)?;
    let delta = plan_catalog(&snapshot, configured, axis);
    if !delta.is_empty() {
        apply_catalog(conn, &delta)?;
        info!(
            target: "catalog:seed_catalog",
            "added {} classes, {} class cars and {} class drivers",
            delta.classes.len(),
            delta.class_cars.len(),
            delta.class_drivers.len()
        );
    }

    Ok(delta)
}
