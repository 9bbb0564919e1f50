use std::collections::{BTreeMap, HashMap};

use chrono::Duration;
use serde::Serialize;

use crate::models::{NewClassCar, NewClassDriver};
use crate::modules::config::ClassAxis;
use crate::modules::models::overall::RallyOverall;

/// an overall result joined to one of the classes it competes in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedResult {
    pub rally_id: i64,
    pub class_id: i32,
    pub user_id: i64,
    pub user_name: String,
    pub time3: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRow {
    pub rally_id: i64,
    pub class_id: i32,
    pub user_id: i64,
    pub user_name: String,
    #[serde(rename = "time3_ns", serialize_with = "serialize_nanos")]
    pub time3: Duration,
    pub position: u32,
}

fn serialize_nanos<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_nanoseconds().unwrap_or(i64::MAX))
}

/// which classes a car or a driver belongs to
#[derive(Debug, Clone, Default)]
pub struct ClassMembership {
    cars: HashMap<i32, Vec<i32>>,
    drivers: HashMap<String, Vec<i32>>,
}

impl ClassMembership {
    pub fn new(class_cars: &[NewClassCar], class_drivers: &[NewClassDriver]) -> ClassMembership {
        let mut membership = ClassMembership::default();

        for entry in class_cars {
            membership.cars.entry(entry.car_id).or_default().push(entry.class_id);
        }
        for entry in class_drivers {
            membership
                .drivers
                .entry(entry.user_name.clone())
                .or_default()
                .push(entry.class_id);
        }

        for classes in membership.cars.values_mut().chain(membership.drivers.values_mut()) {
            classes.sort_unstable();
            classes.dedup();
        }

        membership
    }

    /// class ids of a result row in ascending order
    pub fn classes_for(&self, axis: ClassAxis, row: &RallyOverall) -> &[i32] {
        let classes = match axis {
            ClassAxis::Car => self.cars.get(&row.car_id),
            ClassAxis::Driver => self.drivers.get(&row.user_name),
        };
        classes.map_or(&[], Vec::as_slice)
    }
}

/// # classify results
/// join every overall row to the classes it belongs to on the given axis.
/// a row in several classes is emitted once per class, a row in none is dropped.
pub fn classify(rows: &[RallyOverall], membership: &ClassMembership, axis: ClassAxis) -> Vec<ClassifiedResult> {
    rows.iter()
        .flat_map(|row| {
            membership
                .classes_for(axis, row)
                .iter()
                .map(move |class_id| ClassifiedResult {
                    rally_id: row.rally_id,
                    class_id: *class_id,
                    user_id: row.user_id,
                    user_name: row.user_name.clone(),
                    time3: row.time3(),
                })
        })
        .collect()
}

/// # rank by time
/// partition the items by `partition`, sort each partition by ascending time
/// and number them from 1. equal times keep their input order. items with a
/// time of zero or less did not finish and are left out.
///
/// ## Returns
/// * `Vec<(T, u32)>` - the items with their position, ordered by partition and position
pub fn rank_by_time<T, K, P, D>(items: Vec<T>, partition: P, time: D) -> Vec<(T, u32)>
where
    K: Ord,
    P: Fn(&T) -> K,
    D: Fn(&T) -> Duration,
{
    let mut partitions: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for item in items {
        if time(&item) <= Duration::zero() {
            continue;
        }
        partitions.entry(partition(&item)).or_default().push(item);
    }

    partitions
        .into_values()
        .flat_map(|mut members| {
            members.sort_by_key(|member| time(member));
            members
                .into_iter()
                .enumerate()
                .map(|(index, member)| (member, index as u32 + 1))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// # rank classified results
/// rank every `(rally, class)` partition by ascending time
pub fn rank(results: Vec<ClassifiedResult>) -> Vec<RankedRow> {
    rank_by_time(results, |result| (result.rally_id, result.class_id), |result| result.time3)
        .into_iter()
        .map(|(result, position)| RankedRow {
            rally_id: result.rally_id,
            class_id: result.class_id,
            user_id: result.user_id,
            user_name: result.user_name,
            time3: result.time3,
            position,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(rally_id: i64, class_id: i32, user_id: i64, millis: i64) -> ClassifiedResult {
        ClassifiedResult {
            rally_id,
            class_id,
            user_id,
            user_name: format!("driver{user_id}"),
            time3: Duration::milliseconds(millis),
        }
    }

    fn positions(rows: &[RankedRow]) -> Vec<(i64, i32, i64, u32)> {
        rows.iter()
            .map(|row| (row.rally_id, row.class_id, row.user_id, row.position))
            .collect()
    }

    #[test]
    fn zero_times_are_not_ranked() {
        let rows = rank(vec![
            result(1, 1, 10, 0),
            result(1, 1, 11, 95_200),
            result(1, 1, 12, 0),
            result(1, 1, 13, 87_100),
        ]);

        assert_eq!(positions(&rows), vec![(1, 1, 13, 1), (1, 1, 11, 2)]);
    }

    #[test]
    fn partitions_by_rally_and_class() {
        let rows = rank(vec![
            result(2, 1, 10, 500),
            result(1, 2, 10, 300),
            result(1, 1, 11, 200),
            result(1, 1, 10, 100),
            result(1, 2, 11, 400),
        ]);

        assert_eq!(
            positions(&rows),
            vec![(1, 1, 10, 1), (1, 1, 11, 2), (1, 2, 10, 1), (1, 2, 11, 2), (2, 1, 10, 1)]
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let rows = rank(vec![result(1, 1, 20, 1000), result(1, 1, 10, 1000), result(1, 1, 30, 900)]);

        assert_eq!(positions(&rows), vec![(1, 1, 30, 1), (1, 1, 20, 2), (1, 1, 10, 3)]);
    }

    #[test]
    fn membership_by_axis() {
        let membership = ClassMembership::new(
            &[
                NewClassCar { class_id: 3, car_id: 7 },
                NewClassCar { class_id: 1, car_id: 7 },
                NewClassCar { class_id: 1, car_id: 7 },
            ],
            &[NewClassDriver { class_id: 2, user_name: "anna".to_string() }],
        );

        let row = RallyOverall {
            id: 1,
            rally_id: 5,
            user_id: 9,
            position: Some(1),
            user_name: "anna".to_string(),
            real_name: "Anna".to_string(),
            nationality: "NL".to_string(),
            car: "Skoda Fabia".to_string(),
            car_id: 7,
            time3_ns: 1_000,
            super_rally: 0,
            penalty: 0.0,
        };

        assert_eq!(membership.classes_for(ClassAxis::Car, &row), &[1, 3]);
        assert_eq!(membership.classes_for(ClassAxis::Driver, &row), &[2]);

        let classified = classify(&[row], &membership, ClassAxis::Car);
        assert_eq!(classified.len(), 2);
        assert_eq!(classified[0].class_id, 1);
        assert_eq!(classified[1].class_id, 3);
    }
}
