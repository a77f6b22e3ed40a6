//! Rank snapshots between recomputations.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{Movement, Scope};

/// Ranks from the previous computation of one scope.
///
/// Owned by the caller and passed into each ranking pass. The snapshot is
/// replaced as a whole at the end of a pass; a pass that never reaches
/// [`RankHistory::commit`] leaves the previous snapshot in place.
#[derive(Debug, Clone, Default)]
pub struct RankHistory {
    scope: Option<Scope>,
    ranks: HashMap<String, u32>,
}

impl RankHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope the snapshot belongs to, if any pass has run.
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// Previous rank of a player.
    pub fn previous(&self, player: &str) -> Option<u32> {
        self.ranks.get(player).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Forget every rank and the scope.
    pub fn reset(&mut self) {
        self.scope = None;
        self.ranks.clear();
    }

    /// Switch to `scope`, discarding ranks recorded for any other scope.
    pub fn enter(&mut self, scope: &Scope) {
        if self.scope.as_ref() != Some(scope) {
            if self.scope.is_some() {
                debug!(scope = %scope, "Scope changed, resetting rank history");
            }
            self.reset();
            self.scope = Some(scope.clone());
        }
    }

    /// Movement of `player` now ranked at `rank`.
    pub fn movement(&self, player: &str, rank: u32) -> Option<Movement> {
        let previous = self.previous(player)?;
        match rank.cmp(&previous) {
            std::cmp::Ordering::Less => Some(Movement::Up),
            std::cmp::Ordering::Greater => Some(Movement::Down),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Replace the snapshot with a completed pass.
    pub fn commit(&mut self, ranks: HashMap<String, u32>) {
        self.ranks = ranks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement() {
        let mut history = RankHistory::new();
        history.commit(HashMap::from([("A".to_string(), 2), ("B".to_string(), 1)]));

        assert_eq!(history.movement("A", 1), Some(Movement::Up));
        assert_eq!(history.movement("B", 2), Some(Movement::Down));
        assert_eq!(history.movement("A", 2), None);
        assert_eq!(history.movement("C", 1), None);
    }

    #[test]
    fn test_commit_replaces_whole_snapshot() {
        let mut history = RankHistory::new();
        history.commit(HashMap::from([("A".to_string(), 1)]));
        history.commit(HashMap::from([("B".to_string(), 1)]));

        assert_eq!(history.previous("A"), None);
        assert_eq!(history.previous("B"), Some(1));
    }

    #[test]
    fn test_enter_same_scope_keeps_ranks() {
        let mut history = RankHistory::new();
        let scope = Scope::tournament("cup");
        history.enter(&scope);
        history.commit(HashMap::from([("A".to_string(), 1)]));

        history.enter(&scope);
        assert_eq!(history.previous("A"), Some(1));

        history.enter(&Scope::All);
        assert!(history.is_empty());
        assert_eq!(history.scope(), Some(&Scope::All));
    }

    #[test]
    fn test_reset() {
        let mut history = RankHistory::new();
        history.enter(&Scope::All);
        history.commit(HashMap::from([("A".to_string(), 1)]));
        history.reset();

        assert!(history.is_empty());
        assert!(history.scope().is_none());
    }
}
