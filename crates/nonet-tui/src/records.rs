use nonet_core::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Personal-best completion times, keyed by player name and difficulty.
/// One record per pair; only a strictly lower time replaces an entry.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BestTimes {
    players: HashMap<String, HashMap<String, u64>>,
}

impl BestTimes {
    /// Record file in the platform data dir.
    fn save_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nonet_records.json")
    }

    /// Load the store, falling back to an empty one on any read or parse
    /// failure.
    pub fn load() -> Self {
        match fs::read_to_string(Self::save_path()) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persist the whole store in a single write; a record is never
    /// partially on disk.
    pub fn save(&self) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            let _ = fs::write(Self::save_path(), json);
        }
    }

    /// The stored best time for a (player, difficulty) pair.
    pub fn best(&self, player: &str, difficulty: Difficulty) -> Option<u64> {
        self.players
            .get(player)?
            .get(&difficulty.to_string())
            .copied()
    }

    /// Store `secs` if it beats the existing record, persisting on
    /// update. Returns whether the record changed.
    pub fn record(&mut self, player: &str, difficulty: Difficulty, secs: u64) -> bool {
        if !self.update(player, difficulty, secs) {
            return false;
        }
        self.save();
        true
    }

    fn update(&mut self, player: &str, difficulty: Difficulty, secs: u64) -> bool {
        let by_difficulty = self.players.entry(player.to_string()).or_default();
        let key = difficulty.to_string();
        match by_difficulty.get(&key) {
            Some(&best) if best <= secs => false,
            _ => {
                by_difficulty.insert(key, secs);
                true
            }
        }
    }
}

/// Format seconds as MM:SS, or H:MM:SS past an hour.
pub fn format_time(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_completion_creates_record() {
        let mut times = BestTimes::default();
        assert_eq!(times.best("ada", Difficulty::Easy), None);
        assert!(times.update("ada", Difficulty::Easy, 300));
        assert_eq!(times.best("ada", Difficulty::Easy), Some(300));
    }

    #[test]
    fn test_only_strictly_better_updates() {
        let mut times = BestTimes::default();
        times.update("ada", Difficulty::Medium, 300);
        assert!(!times.update("ada", Difficulty::Medium, 400));
        assert!(!times.update("ada", Difficulty::Medium, 300), "ties keep the old record");
        assert!(times.update("ada", Difficulty::Medium, 299));
        assert_eq!(times.best("ada", Difficulty::Medium), Some(299));
    }

    #[test]
    fn test_records_are_per_player_and_difficulty() {
        let mut times = BestTimes::default();
        times.update("ada", Difficulty::Easy, 100);
        times.update("ada", Difficulty::Hard, 900);
        times.update("grace", Difficulty::Easy, 50);

        assert_eq!(times.best("ada", Difficulty::Easy), Some(100));
        assert_eq!(times.best("ada", Difficulty::Hard), Some(900));
        assert_eq!(times.best("grace", Difficulty::Easy), Some(50));
        assert_eq!(times.best("grace", Difficulty::Hard), None);
    }

    #[test]
    fn test_round_trips_through_json() {
        let mut times = BestTimes::default();
        times.update("ada", Difficulty::Easy, 100);
        let json = serde_json::to_string(&times).unwrap();
        let back: BestTimes = serde_json::from_str(&json).unwrap();
        assert_eq!(back.best("ada", Difficulty::Easy), Some(100));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(75), "01:15");
        assert_eq!(format_time(3601), "1:00:01");
    }
}
