//! Candidate store
//!
//! Append-only list of candidates in insertion order. Every candidate gets
//! an identity when inserted: its explicit key if the record carries one,
//! otherwise a monotonic index that is never handed out twice, not even
//! after [`CandidateStore::clear`].

use crate::error::{EngineError, EngineResult};
use crate::types::{Candidate, CandidateId, ChoiceRecord, DisplayText};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CandidateStore<T> {
    candidates: Vec<Candidate<T>>,
    by_id: HashMap<CandidateId, usize>,
    next_index: usize,
}

impl<T> Default for CandidateStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CandidateStore<T> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            by_id: HashMap::new(),
            next_index: 0,
        }
    }

    pub fn from_records(records: Vec<ChoiceRecord<T>>) -> EngineResult<Self> {
        let mut store = Self::new();
        store.append(records)?;
        Ok(store)
    }

    /// Append records. Either every record is inserted or none is.
    pub fn append(&mut self, records: Vec<ChoiceRecord<T>>) -> EngineResult<usize> {
        self.validate(&records)?;

        let count = records.len();
        self.candidates.reserve(count);
        for record in records {
            let (display, value, enabled, key) = match record {
                ChoiceRecord::Choice(choice) => (
                    DisplayText::Text(choice.name),
                    choice.value,
                    choice.enabled,
                    choice.key,
                ),
                ChoiceRecord::Raw { bytes, value } => match String::from_utf8(bytes) {
                    Ok(text) => (DisplayText::Text(text), value, false, None),
                    Err(err) => (DisplayText::Undecoded(err.into_bytes()), value, false, None),
                },
                // rejected by validate
                ChoiceRecord::Separator(_) => continue,
            };

            let id = match key {
                Some(key) => CandidateId::Key(key),
                None => {
                    let id = CandidateId::Index(self.next_index);
                    self.next_index += 1;
                    id
                }
            };

            self.by_id.insert(id.clone(), self.candidates.len());
            self.candidates.push(Candidate {
                id,
                display,
                value,
                enabled,
            });
        }

        log::debug!("Appended {} candidates (total {})", count, self.candidates.len());
        Ok(count)
    }

    fn validate(&self, records: &[ChoiceRecord<T>]) -> EngineResult<()> {
        let mut keys = std::collections::HashSet::new();
        for record in records {
            match record {
                ChoiceRecord::Separator(label) => {
                    return Err(EngineError::InvalidCandidateSource(format!(
                        "searchable list does not accept separators ({:?})",
                        label
                    )));
                }
                ChoiceRecord::Choice(choice) => {
                    if let Some(key) = &choice.key {
                        let id = CandidateId::Key(key.clone());
                        if self.by_id.contains_key(&id) || !keys.insert(key.as_str()) {
                            return Err(EngineError::InvalidCandidateSource(format!(
                                "duplicate candidate key {:?}",
                                key
                            )));
                        }
                    }
                }
                ChoiceRecord::Raw { .. } => {}
            }
        }
        Ok(())
    }

    /// Drop all candidates; index identities keep counting up.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.by_id.clear();
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate<T>> {
        self.candidates.iter()
    }

    pub fn get(&self, id: &CandidateId) -> Option<&Candidate<T>> {
        self.by_id.get(id).map(|&index| &self.candidates[index])
    }

    /// Insertion position of a candidate.
    pub fn position(&self, id: &CandidateId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        self.by_id.contains_key(id)
    }
}
