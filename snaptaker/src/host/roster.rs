use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::sleep::{sleepers_needed, SleepStatusProvider};

/// Block coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub name: String,
    pub world: String,
    pub position: Position,
    pub sleeping: bool,
}

impl Participant {
    /// Text of the position diagnostic, e.g. `I'm at world (x: 1, y: 64, z: -3)`
    pub fn describe_position(&self) -> String {
        format!(
            "I'm at {} (x: {}, y: {}, z: {})",
            self.world, self.position.x, self.position.y, self.position.z
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("Participant '{0}' is not online")]
    NotOnline(String),
    #[error("Participant '{0}' is already online")]
    AlreadyOnline(String),
}

/// Online participants of the headless host
#[derive(Debug, Default)]
pub struct Roster {
    participants: BTreeMap<String, Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, name: &str, world: &str, position: Position) -> Result<&Participant, RosterError> {
        if self.participants.contains_key(name) {
            return Err(RosterError::AlreadyOnline(name.to_string()));
        }
        let participant = Participant {
            name: name.to_string(),
            world: world.to_string(),
            position,
            sleeping: false,
        };
        Ok(self.participants.entry(name.to_string()).or_insert(participant))
    }

    pub fn leave(&mut self, name: &str) -> Result<Participant, RosterError> {
        self.participants
            .remove(name)
            .ok_or_else(|| RosterError::NotOnline(name.to_string()))
    }

    /// Put a participant to bed; returns the world they sleep in
    pub fn sleep(&mut self, name: &str) -> Result<String, RosterError> {
        let participant = self.get_mut(name)?;
        participant.sleeping = true;
        Ok(participant.world.clone())
    }

    pub fn wake(&mut self, name: &str) -> Result<(), RosterError> {
        self.get_mut(name)?.sleeping = false;
        Ok(())
    }

    pub fn wake_all(&mut self, world: &str) {
        self.participants
            .values_mut()
            .filter(|p| p.world == world)
            .for_each(|p| p.sleeping = false);
    }

    pub fn set_position(&mut self, name: &str, position: Position) -> Result<&Participant, RosterError> {
        let participant = self.get_mut(name)?;
        participant.position = position;
        Ok(participant)
    }

    pub fn get(&self, name: &str) -> Option<&Participant> {
        self.participants.get(name)
    }

    pub fn online(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Participant, RosterError> {
        self.participants
            .get_mut(name)
            .ok_or_else(|| RosterError::NotOnline(name.to_string()))
    }
}

impl SleepStatusProvider for Roster {
    fn enough_sleeping(&self, world: &str, required_percentage: u32) -> bool {
        let in_world: Vec<&Participant> = self.participants.values().filter(|p| p.world == world).collect();
        if in_world.is_empty() {
            return false;
        }
        let sleeping = in_world.iter().filter(|p| p.sleeping).count();
        sleeping >= sleepers_needed(in_world.len(), required_percentage)
    }
}
