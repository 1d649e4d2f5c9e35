use super::record_locks::RecordLocks;
use crate::ports::StoredRecordRepository;
use rotor_dns_domain::{
    AnswerRecord, DnsQuery, RecordData, RecordType, RotationPolicy, ZoneDefaults, DEFAULT_TTL,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound of the per-attempt jitter after a lost version race.
const CONFLICT_BACKOFF_MS: u64 = 5;

/// Outcome of resolving one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub answer: Option<AnswerRecord>,
    /// Whether a rotation step was persisted while answering.
    pub rotated: bool,
    /// Whether the query type has a resolver branch (A, AAAA, CNAME, TXT),
    /// answered or not.
    pub handled: bool,
}

impl Resolution {
    fn empty() -> Self {
        Self::default()
    }

    fn answered(answer: AnswerRecord, rotated: bool) -> Self {
        Self {
            answer: Some(answer),
            rotated,
            handled: true,
        }
    }

    fn unanswered(rotated: bool) -> Self {
        Self {
            answer: None,
            rotated,
            handled: true,
        }
    }
}

/// Value picked from a stored record, with whether its next step was saved.
struct Selection {
    value: String,
    persisted: bool,
}

pub struct ResolveQueryUseCase {
    records: Arc<dyn StoredRecordRepository>,
    zone: Arc<ZoneDefaults>,
    ttl: u32,
    max_attempts: u32,
    locks: RecordLocks,
}

impl ResolveQueryUseCase {
    pub fn new(records: Arc<dyn StoredRecordRepository>, zone: Arc<ZoneDefaults>) -> Self {
        Self {
            records,
            zone,
            ttl: DEFAULT_TTL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            locks: RecordLocks::default(),
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Never fails: lookup and write-back problems are logged and the
    /// configured defaults stand in.
    pub async fn execute(&self, query: &DnsQuery) -> Resolution {
        match query.record_type {
            RecordType::CNAME => {
                let (target, rotated) = match self.select_stored(query, RecordType::CNAME).await {
                    Some(sel) => (sel.value, sel.persisted),
                    None => (self.zone.server_fqdn(), false),
                };
                self.answer(RecordData::CNAME(target), rotated)
            }
            RecordType::TXT => {
                let (text, rotated) = match self.select_stored(query, RecordType::TXT).await {
                    Some(sel) => (sel.value, sel.persisted),
                    None => (self.zone.default_txt.to_string(), false),
                };
                self.answer(RecordData::TXT(text), rotated)
            }
            RecordType::A | RecordType::AAAA => self.resolve_address(query).await,
            other => {
                debug!(domain = %query.domain, record_type = %other, "No answer for query type");
                Resolution::empty()
            }
        }
    }

    async fn resolve_address(&self, query: &DnsQuery) -> Resolution {
        let record_type = query.record_type;

        let Some(sel) = self.select_stored(query, record_type).await else {
            return match (record_type, self.zone.server_ipv6) {
                (RecordType::A, _) => self.answer(RecordData::A(self.zone.server_ip), false),
                (_, Some(v6)) => self.answer(RecordData::AAAA(v6), false),
                (_, None) => Resolution::unanswered(false),
            };
        };

        match RecordData::address(record_type, &sel.value) {
            Ok(data) => self.answer(data, sel.persisted),
            Err(e) => {
                warn!(
                    domain = %query.domain,
                    record_type = %record_type,
                    value = %sel.value,
                    error = %e,
                    "Stored value is not an address of the requested family"
                );
                Resolution::unanswered(sel.persisted)
            }
        }
    }

    fn answer(&self, data: RecordData, rotated: bool) -> Resolution {
        Resolution::answered(AnswerRecord::new(data).with_ttl(self.ttl), rotated)
    }

    /// Reads the stored record, runs one rotation step and writes it back
    /// conditionally on the version that was read.
    ///
    /// Queries in this process hold the record's lock for the whole step, so
    /// every step they take is persisted in order. A version conflict can then
    /// only come from another writer sharing the database: the record is read
    /// again after a jittered pause and the step recomputed. Once attempts run
    /// out the last computed value is served without persisting its step.
    async fn select_stored(&self, query: &DnsQuery, record_type: RecordType) -> Option<Selection> {
        let _guard = self.locks.acquire(&query.domain, record_type).await;
        let mut rng = fastrand::Rng::new();
        let mut last: Option<String> = None;

        for attempt in 1..=self.max_attempts {
            let record = match self.records.get_record(&query.domain, record_type).await {
                Ok(Some(record)) => record,
                Ok(None) => {
                    return last.map(|value| Selection {
                        value,
                        persisted: false,
                    })
                }
                Err(e) => {
                    warn!(
                        domain = %query.domain,
                        record_type = %record_type,
                        error = %e,
                        "Stored record lookup failed"
                    );
                    return last.map(|value| Selection {
                        value,
                        persisted: false,
                    });
                }
            };

            let plan = RotationPolicy::parse_lenient(&record.value).select(&mut rng);
            let Some(new_value) = plan.new_value else {
                return Some(Selection {
                    value: plan.selected,
                    persisted: false,
                });
            };

            match self
                .records
                .update_record(&record.key, record.version, &new_value)
                .await
            {
                Ok(true) => {
                    debug!(
                        domain = %query.domain,
                        record_type = %record_type,
                        selected = %plan.selected,
                        "Rotation step persisted"
                    );
                    return Some(Selection {
                        value: plan.selected,
                        persisted: true,
                    });
                }
                Ok(false) => {
                    debug!(
                        domain = %query.domain,
                        record_type = %record_type,
                        attempt,
                        "Rotation write-back lost a version race, retrying"
                    );
                    last = Some(plan.selected);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(conflict_backoff(attempt, &mut rng)).await;
                    }
                }
                Err(e) => {
                    warn!(
                        domain = %query.domain,
                        record_type = %record_type,
                        error = %e,
                        "Failed to persist rotation step"
                    );
                    return Some(Selection {
                        value: plan.selected,
                        persisted: false,
                    });
                }
            }
        }

        warn!(
            domain = %query.domain,
            record_type = %record_type,
            attempts = self.max_attempts,
            "Rotation write-back kept conflicting, serving without persisting"
        );
        last.map(|value| Selection {
            value,
            persisted: false,
        })
    }
}

fn conflict_backoff(attempt: u32, rng: &mut fastrand::Rng) -> Duration {
    Duration::from_millis(u64::from(attempt) * rng.u64(1..=CONFLICT_BACKOFF_MS))
}
