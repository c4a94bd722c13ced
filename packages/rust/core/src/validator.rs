//! Lesson set validation for a single module.
//!
//! Checks run in a fixed order: titles, orders, duplicate orders, durations,
//! then (strict mode only) unknown front-matter keys. With
//! [`ValidationStrategy::FailFast`] the first violation in that order is
//! returned; with `CollectAll` every violation in the module is.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use curriculum_markdown::word_count;
use curriculum_shared::{
    Lesson, LessonDocument, ValidationOptions, ValidationReport, ValidationStrategy, Violation,
};

type Check = fn(&[LessonDocument], &ValidationOptions) -> Vec<Violation>;

const CHECKS: [Check; 5] = [
    check_titles,
    check_orders,
    check_duplicate_orders,
    check_durations,
    check_extra_keys,
];

/// Validate one module's parsed lessons and return them sorted by `order`.
#[instrument(skip_all, fields(lessons = docs.len(), strategy = %opts.strategy))]
pub fn validate_module(
    docs: Vec<LessonDocument>,
    opts: &ValidationOptions,
) -> std::result::Result<Vec<Lesson>, ValidationReport> {
    let mut report = ValidationReport::new();

    for check in CHECKS {
        let found = check(&docs, opts);
        match opts.strategy {
            ValidationStrategy::FailFast => {
                if let Some(first) = found.into_iter().next() {
                    return Err(first.into());
                }
            }
            ValidationStrategy::CollectAll => {
                for violation in found {
                    report.push(violation);
                }
            }
        }
    }

    report
        .into_result(())
        .inspect_err(|r| debug!(violations = r.len(), "module failed validation"))?;

    // Every document passed the order check, so conversion cannot drop any.
    let mut lessons: Vec<Lesson> = docs.into_iter().filter_map(into_lesson).collect();
    lessons.sort_by_key(|l| l.order);

    debug!(lessons = lessons.len(), "module validated");
    Ok(lessons)
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn check_titles(docs: &[LessonDocument], _opts: &ValidationOptions) -> Vec<Violation> {
    docs.iter()
        .filter(|doc| doc.title.as_deref().is_none_or(|t| t.trim().is_empty()))
        .map(|doc| Violation::MissingTitle {
            path: doc.source.clone(),
            order: doc.order,
        })
        .collect()
}

fn check_orders(docs: &[LessonDocument], _opts: &ValidationOptions) -> Vec<Violation> {
    docs.iter()
        .filter_map(|doc| match doc.order {
            None => Some(Violation::MissingOrder {
                path: doc.source.clone(),
            }),
            Some(value) if positive_u32(value).is_none() => Some(Violation::InvalidOrder {
                path: doc.source.clone(),
                value,
            }),
            Some(_) => None,
        })
        .collect()
}

fn check_duplicate_orders(docs: &[LessonDocument], _opts: &ValidationOptions) -> Vec<Violation> {
    // First file (in module listing order) declaring each order.
    let mut first_seen: BTreeMap<u32, &LessonDocument> = BTreeMap::new();
    let mut violations = Vec::new();

    for doc in docs {
        let Some(order) = doc.order.and_then(positive_u32) else {
            continue;
        };
        match first_seen.get(&order) {
            Some(first) => violations.push(Violation::DuplicateOrder {
                order: i64::from(order),
                first: first.source.clone(),
                second: doc.source.clone(),
            }),
            None => {
                first_seen.insert(order, doc);
            }
        }
    }

    violations
}

fn check_durations(docs: &[LessonDocument], _opts: &ValidationOptions) -> Vec<Violation> {
    docs.iter()
        .filter_map(|doc| {
            let value = doc.estimated_minutes?;
            positive_u32(value)
                .is_none()
                .then(|| Violation::InvalidDuration {
                    path: doc.source.clone(),
                    order: doc.order,
                    value,
                })
        })
        .collect()
}

fn check_extra_keys(docs: &[LessonDocument], opts: &ValidationOptions) -> Vec<Violation> {
    if !opts.strict_front_matter {
        return Vec::new();
    }

    docs.iter()
        .flat_map(|doc| {
            doc.extra
                .keys()
                .filter(|key| !opts.allowed_extra_keys.iter().any(|k| k == *key))
                .map(|key| Violation::UnknownField {
                    path: doc.source.clone(),
                    order: doc.order,
                    field: key.clone(),
                })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn positive_u32(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| *v > 0)
}

fn into_lesson(doc: LessonDocument) -> Option<Lesson> {
    let order = doc.order.and_then(positive_u32)?;
    let title = doc.title?.trim().to_string();
    let estimated_minutes = doc.estimated_minutes.and_then(positive_u32);

    Some(Lesson {
        word_count: word_count(&doc.body),
        content_hash: content_hash(&doc.body),
        source: doc.source,
        title,
        order,
        estimated_minutes,
        body: doc.body,
        extra: doc.extra,
    })
}

/// SHA-256 of the lesson body, hex encoded.
pub fn content_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
