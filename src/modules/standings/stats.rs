use chrono::Duration;

use crate::errors::{CustomResult, NoFinishersSnafu};
use crate::modules::helpers::duration::{from_seconds, to_seconds};
use crate::modules::helpers::math::Math;
use crate::modules::models::overall::{Position, RallyOverall};
use crate::modules::models::stage::RallyStage;
use crate::modules::standings::ranking::rank_by_time;

/// how a driver did on one stage compared to the field
#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    pub stage_num: i32,
    pub stage_name: String,
    /// `None` when the driver set no time on the stage
    pub position: Option<u32>,
    pub time: Option<Duration>,
    pub delta: Option<Duration>,
    pub penalty: f64,
    pub comments: String,
}

/// # stage summaries
/// for every stage the driver drove: the position among everyone with a time,
/// the stage time including penalties and the gap to the stage winner.
///
/// ## Arguments
/// * `stages` - every stage row of the rally
/// * `user_name` - the driver
pub fn stage_summaries(stages: &[RallyStage], user_name: &str) -> Vec<StageSummary> {
    let ranked = rank_by_time(
        stages.iter().collect::<Vec<_>>(),
        |stage| stage.stage_num,
        |stage| if stage.time3 > 0.0 { stage.total_time() } else { Duration::zero() },
    );

    let winners: std::collections::HashMap<i32, Duration> = ranked
        .iter()
        .filter(|(_, position)| *position == 1)
        .map(|(stage, _)| (stage.stage_num, stage.total_time()))
        .collect();

    stages
        .iter()
        .filter(|stage| stage.user_name == user_name)
        .map(|stage| {
            let position = ranked
                .iter()
                .find(|(ranked_stage, _)| std::ptr::eq(*ranked_stage, stage))
                .map(|(_, position)| *position);
            let time = position.map(|_| stage.total_time());

            StageSummary {
                stage_num: stage.stage_num,
                stage_name: stage.stage_name.clone(),
                position,
                time,
                delta: time.and_then(|time| winners.get(&stage.stage_num).map(|winner| time - *winner)),
                penalty: stage.total_penalty(),
                comments: stage.comments.clone(),
            }
        })
        .collect()
}

/// field wide values of one rally, computed once per rally
#[derive(Debug, Clone, PartialEq)]
pub struct RallyContext {
    pub rally_id: i64,
    pub winner_time: Duration,
    pub average_time: Duration,
    pub average_position: f64,
    pub average_penalty: f64,
    pub average_super_rally: f64,
    pub finishers: usize,
    pub entrants: usize,
}

/// one driver's rally compared to the field
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRallySummary {
    pub user_name: String,
    pub position: Position,
    pub total_time: Option<Duration>,
    pub delta_to_winner: Option<Duration>,
    pub penalty: f64,
    pub super_rally: i64,
}

impl RallyContext {
    /// # rally context
    /// time values are averaged over the finishers, penalty and super rally
    /// counts over every entrant.
    ///
    /// ## Returns
    /// * `RallyContext` - or `NoFinishersError` when nobody set a time
    pub fn from_overall(rally_id: i64, overall: &[RallyOverall]) -> CustomResult<RallyContext> {
        let finishers: Vec<&RallyOverall> = overall.iter().filter(|row| row.finished()).collect();

        let winner_time = match finishers.iter().map(|row| row.time3()).min() {
            Some(time) => time,
            None => return NoFinishersSnafu { rally_id }.fail(),
        };

        let times: Vec<f64> = finishers.iter().map(|row| to_seconds(row.time3())).collect();
        let positions: Vec<f64> = finishers
            .iter()
            .filter_map(|row| row.position().finished())
            .map(|position| position as f64)
            .collect();
        let penalties: Vec<f64> = overall.iter().map(|row| row.penalty).collect();
        let super_rallies: Vec<f64> = overall.iter().map(|row| row.super_rally as f64).collect();

        Ok(RallyContext {
            rally_id,
            winner_time,
            average_time: from_seconds(Math::mean(&times).unwrap_or(0.0)),
            average_position: Math::mean(&positions).unwrap_or(0.0),
            average_penalty: Math::mean(&penalties).unwrap_or(0.0),
            average_super_rally: Math::mean(&super_rallies).unwrap_or(0.0),
            finishers: finishers.len(),
            entrants: overall.len(),
        })
    }

    /// time based values are `None` for a driver that did not finish
    pub fn driver_summary(&self, row: &RallyOverall) -> DriverRallySummary {
        let total_time = if row.finished() { Some(row.time3()) } else { None };

        DriverRallySummary {
            user_name: row.user_name.clone(),
            position: row.position(),
            total_time,
            delta_to_winner: total_time.map(|time| time - self.winner_time),
            penalty: row.penalty,
            super_rally: row.super_rally,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stage(stage_num: i32, user_name: &str, time3: f64, penalty: f64) -> RallyStage {
        RallyStage {
            id: 0,
            rally_id: 1,
            stage_num,
            stage_name: format!("SS{stage_num}"),
            nationality: "FI".to_string(),
            user_name: user_name.to_string(),
            real_name: String::new(),
            car_group: "Group A8".to_string(),
            car_name: "Toyota Corolla WRC".to_string(),
            time1: 0.0,
            time2: 0.0,
            time3,
            finish_real_time: None,
            penalty,
            service_penalty: 0.0,
            super_rally: false,
            progress: String::new(),
            comments: "ok".to_string(),
        }
    }

    fn overall(user_name: &str, position: Option<i32>, seconds: i64, penalty: f64, super_rally: i64) -> RallyOverall {
        RallyOverall {
            id: 0,
            rally_id: 1,
            user_id: 1,
            position,
            user_name: user_name.to_string(),
            real_name: String::new(),
            nationality: "FI".to_string(),
            car: String::new(),
            car_id: 1,
            time3_ns: seconds * 1_000_000_000,
            super_rally,
            penalty,
        }
    }

    #[test]
    fn stage_positions_include_penalties() {
        let stages = vec![
            stage(1, "anna", 100.0, 10.0),
            stage(1, "bert", 105.0, 0.0),
            stage(1, "carl", 0.0, 0.0),
            stage(2, "anna", 90.0, 0.0),
            stage(2, "bert", 88.0, 0.0),
        ];

        let summaries = stage_summaries(&stages, "anna");
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].position, Some(2));
        assert_eq!(summaries[0].time, Some(Duration::seconds(110)));
        assert_eq!(summaries[0].delta, Some(Duration::seconds(5)));
        assert_eq!(summaries[0].penalty, 10.0);

        assert_eq!(summaries[1].position, Some(2));
        assert_eq!(summaries[1].delta, Some(Duration::seconds(2)));

        let carl = stage_summaries(&stages, "carl");
        assert_eq!(carl[0].position, None);
        assert_eq!(carl[0].time, None);
        assert_eq!(carl[0].delta, None);
    }

    #[test]
    fn context_averages() {
        let rows = vec![
            overall("anna", Some(1), 3600, 0.0, 0),
            overall("bert", Some(2), 3700, 10.0, 2),
            overall("carl", None, 0, 20.0, 4),
        ];

        let context = RallyContext::from_overall(1, &rows).unwrap();
        assert_eq!(context.winner_time, Duration::seconds(3600));
        assert_eq!(context.average_time, Duration::seconds(3650));
        assert_eq!(context.average_position, 1.5);
        assert_eq!(context.average_penalty, 10.0);
        assert_eq!(context.average_super_rally, 2.0);
        assert_eq!(context.finishers, 2);
        assert_eq!(context.entrants, 3);

        let bert = context.driver_summary(&rows[1]);
        assert_eq!(bert.delta_to_winner, Some(Duration::seconds(100)));

        let carl = context.driver_summary(&rows[2]);
        assert_eq!(carl.position, Position::NotFinished);
        assert_eq!(carl.total_time, None);
        assert_eq!(carl.delta_to_winner, None);
        assert_eq!(carl.penalty, 20.0);
        assert_eq!(carl.super_rally, 4);
    }

    #[test]
    fn no_finishers_is_an_error() {
        let rows = vec![overall("carl", None, 0, 0.0, 0)];
        assert!(RallyContext::from_overall(1, &rows).is_err());
        assert!(RallyContext::from_overall(1, &[]).is_err());
    }
}
