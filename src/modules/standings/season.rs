use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use chrono::Duration;
use serde::Serialize;

use crate::modules::helpers::math::Math;
use crate::modules::models::overall::RallyOverall;
use crate::modules::models::stage::RallyStage;
use crate::modules::standings::points::PointsTable;
use crate::modules::standings::ranking::RankedRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonStanding {
    pub position: u32,
    pub user_id: i64,
    pub user_name: String,
    pub nationality: String,
    pub rallies: u32,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStanding {
    pub class_id: i32,
    pub position: u32,
    pub user_id: i64,
    pub user_name: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverSummary {
    pub user_name: String,
    pub nationality: String,
    pub rallies_started: u32,
    pub rally_wins: u32,
    pub podiums: u32,
    pub stage_wins: u32,
    pub best_position: Option<u32>,
    pub average_position: Option<f64>,
    pub super_rallied_stages: u32,
    pub points: u32,
}

/// # accumulate points
/// sum points per group key. groups come out in the order they were first
/// encountered, so a stable sort on the result keeps ties in encounter order.
///
/// ## Arguments
/// * `rows` - the scored rows
/// * `key_fn` - the grouping key of a row
/// * `points_fn` - the points a row is worth
///
/// ## Returns
/// * `Vec<(K, u32)>` - the points total of every group
pub fn accumulate_points<T, K, F, P>(rows: &[T], key_fn: F, points_fn: P) -> Vec<(K, u32)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
    P: Fn(&T) -> u32,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut totals: Vec<(K, u32)> = Vec::new();

    for row in rows {
        let key = key_fn(row);
        let points = points_fn(row);
        match index.get(&key) {
            Some(at) => totals[*at].1 += points,
            None => {
                index.insert(key.clone(), totals.len());
                totals.push((key, points));
            }
        }
    }

    totals
}

/// # season standings
/// total championship points per driver over every stored overall row,
/// highest first. drivers are told apart by user name, positions follow
/// the sorted order.
pub fn season_standings(rows: &[RallyOverall], points: &PointsTable) -> Vec<SeasonStanding> {
    let mut totals = accumulate_points(
        rows,
        |row| row.user_name.clone(),
        |row| points.points_for_position(row.position()),
    );
    totals.sort_by(|a, b| b.1.cmp(&a.1));

    let by_driver = rows_by_driver(rows);

    totals
        .into_iter()
        .enumerate()
        .filter_map(|(index, (user_name, total))| {
            let driver_rows = by_driver.get(user_name.as_str())?;
            let first = driver_rows.first()?;
            let rallies: HashSet<i64> = driver_rows.iter().map(|row| row.rally_id).collect();
            Some(SeasonStanding {
                position: index as u32 + 1,
                user_id: first.user_id,
                nationality: first.nationality.clone(),
                rallies: rallies.len() as u32,
                points: total,
                user_name,
            })
        })
        .collect()
}

/// # class championship
/// points per `(class, driver)` from ranked rows, every class sorted on its own
///
/// ## Returns
/// * `BTreeMap<i32, Vec<ClassStanding>>` - standings per class id
pub fn class_championship(rows: &[RankedRow], points: &PointsTable) -> BTreeMap<i32, Vec<ClassStanding>> {
    let totals = accumulate_points(
        rows,
        |row| (row.class_id, row.user_name.clone()),
        |row| points.points_for(row.position),
    );

    let mut user_ids: HashMap<&str, i64> = HashMap::new();
    for row in rows {
        user_ids.entry(row.user_name.as_str()).or_insert(row.user_id);
    }

    let mut per_class: BTreeMap<i32, Vec<(String, u32)>> = BTreeMap::new();
    for ((class_id, user_name), total) in totals {
        per_class.entry(class_id).or_default().push((user_name, total));
    }

    per_class
        .into_iter()
        .map(|(class_id, mut drivers)| {
            drivers.sort_by(|a, b| b.1.cmp(&a.1));
            let standings = drivers
                .into_iter()
                .enumerate()
                .map(|(index, (user_name, total))| ClassStanding {
                    class_id,
                    position: index as u32 + 1,
                    user_id: user_ids.get(user_name.as_str()).copied().unwrap_or(0),
                    user_name,
                    points: total,
                })
                .collect();
            (class_id, standings)
        })
        .collect()
}

/// overall rows per user name, each list in input order
fn rows_by_driver(rows: &[RallyOverall]) -> HashMap<&str, Vec<&RallyOverall>> {
    let mut by_driver: HashMap<&str, Vec<&RallyOverall>> = HashMap::new();
    for row in rows {
        by_driver.entry(row.user_name.as_str()).or_default().push(row);
    }
    by_driver
}

/// # stage winners
/// user names that set the fastest time3 of a `(rally, stage)` group.
/// equal fastest times all count. rows without a time are ignored.
///
/// ## Returns
/// * `HashMap<String, u32>` - stage wins per user name
pub fn stage_wins(stages: &[RallyStage]) -> HashMap<String, u32> {
    let mut fastest: HashMap<(i64, i32), f64> = HashMap::new();
    for stage in stages.iter().filter(|stage| stage.time3 > 0.0) {
        fastest
            .entry((stage.rally_id, stage.stage_num))
            .and_modify(|best| *best = best.min(stage.time3))
            .or_insert(stage.time3);
    }

    let mut wins: HashMap<String, u32> = HashMap::new();
    for stage in stages.iter().filter(|stage| stage.time3 > 0.0) {
        if fastest.get(&(stage.rally_id, stage.stage_num)) == Some(&stage.time3) {
            *wins.entry(stage.user_name.clone()).or_default() += 1;
        }
    }

    wins
}

/// # driver summaries
/// one statistics row per driver over the whole season, in the order
/// drivers first appear in the overall rows
pub fn driver_summaries(overall: &[RallyOverall], stages: &[RallyStage], points: &PointsTable) -> Vec<DriverSummary> {
    let wins = stage_wins(stages);

    let mut super_rallied: HashMap<&str, u32> = HashMap::new();
    for stage in stages.iter().filter(|stage| stage.super_rally) {
        *super_rallied.entry(stage.user_name.as_str()).or_default() += 1;
    }

    let totals = accumulate_points(overall, |row| row.user_name.clone(), |row| points.points_for_position(row.position()));
    let by_driver = rows_by_driver(overall);

    totals
        .into_iter()
        .map(|(user_name, total)| {
            let rows: &[&RallyOverall] = by_driver.get(user_name.as_str()).map(Vec::as_slice).unwrap_or_default();
            let positions: Vec<u32> = rows.iter().filter_map(|row| row.position().finished()).collect();
            let rallies: HashSet<i64> = rows.iter().map(|row| row.rally_id).collect();
            let as_floats: Vec<f64> = positions.iter().map(|position| *position as f64).collect();

            DriverSummary {
                nationality: rows.first().map_or_else(String::new, |row| row.nationality.clone()),
                rallies_started: rallies.len() as u32,
                rally_wins: positions.iter().filter(|position| **position == 1).count() as u32,
                podiums: positions.iter().filter(|position| **position <= 3).count() as u32,
                stage_wins: wins.get(&user_name).copied().unwrap_or(0),
                best_position: positions.iter().min().copied(),
                average_position: Math::mean(&as_floats).map(|mean| Math::round_float_to_n_decimals(mean, 2)),
                super_rallied_stages: super_rallied.get(user_name.as_str()).copied().unwrap_or(0),
                points: total,
                user_name,
            }
        })
        .collect()
}

/// total time of the fastest finisher, `None` when nobody finished
pub fn winner_time(rows: &[RallyOverall]) -> Option<Duration> {
    rows.iter().filter(|row| row.finished()).map(RallyOverall::time3).min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn overall(rally_id: i64, user_id: i64, position: Option<i32>, seconds: i64) -> RallyOverall {
        RallyOverall {
            id: 0,
            rally_id,
            user_id,
            position,
            user_name: format!("driver{user_id}"),
            real_name: String::new(),
            nationality: "NL".to_string(),
            car: "Skoda Fabia Rally2".to_string(),
            car_id: 1,
            time3_ns: seconds * 1_000_000_000,
            super_rally: 0,
            penalty: 0.0,
        }
    }

    fn stage(rally_id: i64, stage_num: i32, user_name: &str, time3: f64, super_rally: bool) -> RallyStage {
        RallyStage {
            id: 0,
            rally_id,
            stage_num,
            stage_name: format!("SS{stage_num}"),
            nationality: "NL".to_string(),
            user_name: user_name.to_string(),
            real_name: String::new(),
            car_group: "Rally2".to_string(),
            car_name: "Skoda Fabia Rally2".to_string(),
            time1: 0.0,
            time2: 0.0,
            time3,
            finish_real_time: None,
            penalty: 0.0,
            service_penalty: 0.0,
            super_rally,
            progress: String::new(),
            comments: String::new(),
        }
    }

    #[test]
    fn accumulate_keeps_encounter_order() {
        let rows = vec![("b", 3), ("a", 5), ("b", 4), ("c", 0)];
        let totals = accumulate_points(&rows, |row| row.0, |row| row.1);
        assert_eq!(totals, vec![("b", 7), ("a", 5), ("c", 0)]);
    }

    #[test]
    fn standings_over_two_rallies() {
        let rows = vec![
            overall(1, 10, Some(1), 3600),
            overall(1, 11, Some(2), 3650),
            overall(1, 12, None, 0),
            overall(2, 11, Some(1), 3500),
            overall(2, 10, Some(2), 3550),
        ];

        let standings = season_standings(&rows, &PointsTable::default());
        let summary: Vec<(u32, i64, u32, u32)> = standings
            .iter()
            .map(|standing| (standing.position, standing.user_id, standing.points, standing.rallies))
            .collect();

        // 10 and 11 are tied on 60, 10 was seen first
        assert_eq!(summary, vec![(1, 10, 60, 2), (2, 11, 60, 2), (3, 12, 0, 1)]);
    }

    #[test]
    fn drivers_without_user_id_stay_apart() {
        let mut anna = overall(1, 0, Some(1), 3600);
        anna.user_name = "anna".to_string();
        let mut bert = overall(1, 0, Some(2), 3650);
        bert.user_name = "bert".to_string();
        let rows = vec![anna, bert];
        let table = PointsTable::default();

        let standings: Vec<(String, u32)> = season_standings(&rows, &table)
            .into_iter()
            .map(|standing| (standing.user_name, standing.points))
            .collect();
        let summaries: Vec<(String, u32)> = driver_summaries(&rows, &[], &table)
            .into_iter()
            .map(|summary| (summary.user_name, summary.points))
            .collect();

        assert_eq!(standings, vec![("anna".to_string(), 32), ("bert".to_string(), 28)]);
        assert_eq!(standings, summaries);

        let ranked = vec![
            RankedRow { rally_id: 1, class_id: 3, user_id: 0, user_name: "anna".into(), time3: Duration::seconds(10), position: 1 },
            RankedRow { rally_id: 1, class_id: 3, user_id: 0, user_name: "bert".into(), time3: Duration::seconds(11), position: 2 },
        ];
        let class_three: Vec<(u32, String, u32)> = class_championship(&ranked, &PointsTable::new(vec![10, 6]))[&3]
            .iter()
            .map(|standing| (standing.position, standing.user_name.clone(), standing.points))
            .collect();
        assert_eq!(class_three, vec![(1, "anna".to_string(), 10), (2, "bert".to_string(), 6)]);
    }

    #[test]
    fn standings_are_a_pure_function() {
        let rows = vec![overall(1, 10, Some(2), 3650), overall(1, 11, Some(1), 3600)];
        let table = PointsTable::default();

        assert_eq!(season_standings(&rows, &table), season_standings(&rows, &table));
    }

    #[test]
    fn class_championship_per_class() {
        let ranked = vec![
            RankedRow { rally_id: 1, class_id: 2, user_id: 10, user_name: "a".into(), time3: Duration::seconds(10), position: 1 },
            RankedRow { rally_id: 1, class_id: 2, user_id: 11, user_name: "b".into(), time3: Duration::seconds(11), position: 2 },
            RankedRow { rally_id: 1, class_id: 5, user_id: 11, user_name: "b".into(), time3: Duration::seconds(11), position: 1 },
            RankedRow { rally_id: 2, class_id: 2, user_id: 11, user_name: "b".into(), time3: Duration::seconds(9), position: 1 },
        ];

        let table = PointsTable::new(vec![10, 6, 4]);
        let championship = class_championship(&ranked, &table);

        let class_two: Vec<(u32, i64, u32)> = championship[&2]
            .iter()
            .map(|standing| (standing.position, standing.user_id, standing.points))
            .collect();
        assert_eq!(class_two, vec![(1, 11, 16), (2, 10, 10)]);
        assert_eq!(championship[&5].len(), 1);
        assert_eq!(championship[&5][0].points, 10);
    }

    #[test]
    fn tied_stage_times_both_win() {
        let stages = vec![
            stage(1, 1, "anna", 120.5, false),
            stage(1, 1, "bert", 120.5, false),
            stage(1, 1, "carl", 0.0, true),
            stage(1, 2, "bert", 99.0, true),
            stage(1, 2, "anna", 101.0, false),
        ];

        let wins = stage_wins(&stages);
        assert_eq!(wins.get("anna"), Some(&1));
        assert_eq!(wins.get("bert"), Some(&2));
        assert_eq!(wins.get("carl"), None);
    }

    #[test]
    fn summaries_count_starts_wins_and_podiums() {
        let rows = vec![
            overall(1, 10, Some(1), 3600),
            overall(1, 11, Some(2), 3650),
            overall(1, 12, None, 0),
            overall(2, 10, Some(3), 3700),
        ];
        let stages = vec![stage(1, 1, "driver10", 60.0, false), stage(1, 1, "driver12", 0.0, true)];

        let summaries = driver_summaries(&rows, &stages, &PointsTable::default());

        assert_eq!(
            summaries[0],
            DriverSummary {
                user_name: "driver10".to_string(),
                nationality: "NL".to_string(),
                rallies_started: 2,
                rally_wins: 1,
                podiums: 2,
                stage_wins: 1,
                best_position: Some(1),
                average_position: Some(2.0),
                super_rallied_stages: 0,
                points: 57,
            }
        );
        assert_eq!(summaries[2].user_name, "driver12");
        assert_eq!(summaries[2].best_position, None);
        assert_eq!(summaries[2].average_position, None);
        assert_eq!(summaries[2].super_rallied_stages, 1);
        assert_eq!(summaries[2].rallies_started, 1);
    }

    #[test]
    fn winner_time_ignores_non_finishers() {
        let rows = vec![overall(1, 10, None, 0), overall(1, 11, Some(1), 3650)];
        assert_eq!(winner_time(&rows), Some(Duration::seconds(3650)));
        assert_eq!(winner_time(&[overall(1, 10, None, 0)]), None);
    }
}
