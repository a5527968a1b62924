use std::collections::HashSet;

use airdrop_core::Identity;
use serde::{Deserialize, Serialize};

use crate::artifact::hex_identity;

/// Produces the identities to commit to
pub trait EligibilitySource {
    /// Distinct identities, in first-seen order
    fn eligible(&self) -> Vec<Identity>;
}

fn distinct(identities: impl IntoIterator<Item = Identity>) -> Vec<Identity> {
    let mut seen = HashSet::new();
    identities
        .into_iter()
        .filter(|identity| seen.insert(*identity))
        .collect()
}

impl EligibilitySource for [Identity] {
    fn eligible(&self) -> Vec<Identity> {
        distinct(self.iter().copied())
    }
}

impl EligibilitySource for Vec<Identity> {
    fn eligible(&self) -> Vec<Identity> {
        self.as_slice().eligible()
    }
}

/// An action that makes its account eligible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifyingEvent {
    #[serde(with = "hex_identity")]
    pub account: Identity,
    pub block_number: u64,
}

/// Inclusive block window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub from_block: u64,
    pub cutoff_block: u64,
}

impl BlockRange {
    pub fn contains(&self, block_number: u64) -> bool {
        (self.from_block..=self.cutoff_block).contains(&block_number)
    }
}

/// Qualifying events in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<QualifyingEvent>,
}

impl EventLog {
    pub fn new(events: Vec<QualifyingEvent>) -> Self {
        Self { events }
    }

    pub fn record(&mut self, account: Identity, block_number: u64) {
        self.events.push(QualifyingEvent {
            account,
            block_number,
        });
    }

    pub fn events(&self) -> &[QualifyingEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every account that appears in the log, in or out of any range
    pub fn accounts(&self) -> Vec<Identity> {
        distinct(self.events.iter().map(|event| event.account))
    }

    /// Events inside `range`
    pub fn query(&self, range: BlockRange) -> impl Iterator<Item = &QualifyingEvent> + '_ {
        self.events
            .iter()
            .filter(move |event| range.contains(event.block_number))
    }

    pub fn scan(&self, range: BlockRange) -> EventScan<'_> {
        EventScan { log: self, range }
    }
}

/// An [`EventLog`] restricted to a block range. Each account counts once.
#[derive(Debug, Clone, Copy)]
pub struct EventScan<'a> {
    log: &'a EventLog,
    range: BlockRange,
}

impl EligibilitySource for EventScan<'_> {
    fn eligible(&self) -> Vec<Identity> {
        distinct(self.log.query(self.range).map(|event| event.account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchases() -> EventLog {
        // Twenty accounts buying in blocks 2..=21
        let mut log = EventLog::default();
        for i in 0..20u8 {
            log.record([i; 20], u64::from(i) + 2);
        }
        log
    }

    #[test]
    fn test_scan_is_inclusive() {
        let log = purchases();
        let range = BlockRange {
            from_block: 1,
            cutoff_block: 11,
        };

        assert_eq!(log.query(range).count(), 10);
        let eligible = log.scan(range).eligible();
        assert_eq!(eligible, (0..10u8).map(|i| [i; 20]).collect::<Vec<_>>());
    }

    #[test]
    fn test_repeat_buyers_counted_once() {
        let mut log = purchases();
        log.record([3u8; 20], 5);
        log.record([3u8; 20], 9);

        let range = BlockRange {
            from_block: 2,
            cutoff_block: 9,
        };
        let eligible = log.scan(range).eligible();
        assert_eq!(eligible.len(), 8);
        assert_eq!(eligible.iter().filter(|a| **a == [3u8; 20]).count(), 1);
        assert_eq!(log.accounts().len(), 20);
    }

    #[test]
    fn test_static_list() {
        let list = vec![[1u8; 20], [2u8; 20], [1u8; 20]];
        assert_eq!(list.eligible(), vec![[1u8; 20], [2u8; 20]]);
    }

    #[test]
    fn test_json_shape() {
        let raw = r#"[{ "account": "0x0101010101010101010101010101010101010101", "block_number": 4 }]"#;
        let log: EventLog = serde_json::from_str(raw).unwrap();
        assert_eq!(log.events(), &[QualifyingEvent { account: [1u8; 20], block_number: 4 }]);
        assert_eq!(serde_json::from_str::<EventLog>(&serde_json::to_string(&log).unwrap()).unwrap(), log);
    }
}
