//! Display aggregates derived from already-loaded data. Everything here is
//! pure; callers pass in whatever they fetched.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::team::{MemberRole, Team};
use crate::models::wellbeing::CheckIn;

/// Members at or above this energy count as "in sync".
pub const ENERGY_SYNC_THRESHOLD: i32 = 6;

const LOW_ENERGY_MESSAGE: &str = "Low energy detected. Consider a team break or async check-in.";
const GOOD_ENERGY_MESSAGE: &str = "Team energy is good! Great time for collaboration.";

pub fn mood_emoji(mood: i32) -> &'static str {
    if mood >= 8 {
        "😊"
    } else if mood >= 6 {
        "🙂"
    } else if mood >= 4 {
        "😐"
    } else if mood >= 2 {
        "😕"
    } else {
        "😔"
    }
}

/// Mean mood rounded half-up. `None` for an empty slice.
pub fn average_mood(moods: &[i32]) -> Option<i32> {
    if moods.is_empty() {
        return None;
    }
    let sum: i64 = moods.iter().map(|&m| i64::from(m)).sum();
    Some(round_half_up(sum as f64 / moods.len() as f64))
}

/// Percentage of energies at or above [`ENERGY_SYNC_THRESHOLD`], rounded.
pub fn energy_sync_percent(energies: &[i32]) -> Option<i32> {
    if energies.is_empty() {
        return None;
    }
    let in_sync = energies
        .iter()
        .filter(|&&e| e >= ENERGY_SYNC_THRESHOLD)
        .count();
    Some(round_half_up(in_sync as f64 * 100.0 / energies.len() as f64))
}

pub fn energy_message(energy_sync: i32) -> &'static str {
    if energy_sync < 50 {
        LOW_ENERGY_MESSAGE
    } else {
        GOOD_ENERGY_MESSAGE
    }
}

fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberPulse {
    pub user_id: Uuid,
    pub name: String,
    pub role: MemberRole,
    pub mood: Option<i32>,
    pub energy: Option<i32>,
    pub mood_emoji: Option<&'static str>,
}

/// Team wellbeing card.
#[derive(Debug, Clone, Serialize)]
pub struct TeamPulse {
    pub team_id: Uuid,
    pub team_name: String,
    pub average_mood: Option<i32>,
    pub mood_emoji: Option<&'static str>,
    pub energy_sync: Option<i32>,
    pub energy_message: Option<&'static str>,
    pub reporting_members: usize,
    pub members: Vec<MemberPulse>,
}

/// Builds the team card from each member's latest check-in. Members who
/// have never checked in are listed without scores and left out of the
/// aggregates.
pub fn team_pulse(team: &Team, latest_check_ins: &[CheckIn]) -> TeamPulse {
    let latest: HashMap<Uuid, &CheckIn> = latest_check_ins
        .iter()
        .map(|c| (c.user_id, c))
        .collect();

    let members: Vec<MemberPulse> = team
        .members
        .iter()
        .map(|member| {
            let check_in = latest.get(&member.user_id);
            MemberPulse {
                user_id: member.user_id,
                name: member.name.clone(),
                role: member.role,
                mood: check_in.map(|c| c.mood),
                energy: check_in.map(|c| c.energy),
                mood_emoji: check_in.map(|c| mood_emoji(c.mood)),
            }
        })
        .collect();

    let moods: Vec<i32> = members.iter().filter_map(|m| m.mood).collect();
    let energies: Vec<i32> = members.iter().filter_map(|m| m.energy).collect();

    let average_mood = average_mood(&moods);
    let energy_sync = energy_sync_percent(&energies);

    TeamPulse {
        team_id: team.id(),
        team_name: team.record.name.clone(),
        average_mood,
        mood_emoji: average_mood.map(mood_emoji),
        energy_sync,
        energy_message: energy_sync.map(energy_message),
        reporting_members: moods.len(),
        members,
    }
}
