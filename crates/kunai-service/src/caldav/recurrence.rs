//! Recurrence expansion for time-range evaluation.
//!
//! Instances are generated with the `rrule` crate from `DTSTART`, `RRULE`,
//! `RDATE` and `EXDATE`. Expansion always happens in UTC, is bounded by the
//! query window and capped at a configured number of instances.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz as ZoneTz;
use rrule::{RRule, RRuleSet, Tz, Unvalidated};

use kunai_rfc::rfc::dav::core::TimeRange;
use kunai_rfc::rfc::ical::core::{Component, ICalDateTime};

use crate::error::{ServiceError, ServiceResult};

/// Returns whether the component carries any recurrence property.
#[must_use]
pub fn is_recurring(component: &Component) -> bool {
    component.get_property("RRULE").is_some() || component.get_property("RDATE").is_some()
}

/// ## Summary
/// Collects the UTC values of every `RDATE` or `EXDATE` property.
///
/// Values may be comma-separated lists; `PERIOD` values contribute their
/// start. Values that do not parse are skipped.
#[must_use]
pub fn date_list(component: &Component, property_name: &str, floating_tz: ZoneTz) -> Vec<DateTime<Utc>> {
    component
        .get_properties(property_name)
        .flat_map(|prop| {
            let tzid = prop.param_value("TZID");
            prop.value
                .split(',')
                .filter_map(move |raw| {
                    let start = raw.split('/').next().unwrap_or(raw).trim();
                    ICalDateTime::parse(start, tzid)?.to_utc(floating_tz)
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// ## Summary
/// Builds the recurrence set of a component anchored at `dtstart`.
///
/// A component with only `RDATE` still yields a set whose first instance is
/// `DTSTART`.
///
/// ## Errors
/// Returns `ValidationError` if the `RRULE` does not parse or is rejected
/// by the recurrence engine.
pub fn build_rrule_set(
    component: &Component,
    dtstart: DateTime<Utc>,
    floating_tz: ZoneTz,
) -> ServiceResult<RRuleSet> {
    let dt_start = dtstart.with_timezone(&Tz::UTC);

    let mut rdates: Vec<DateTime<Tz>> = date_list(component, "RDATE", floating_tz)
        .iter()
        .map(|dt| dt.with_timezone(&Tz::UTC))
        .collect();

    let mut rrule_set = if let Some(prop) = component.get_property("RRULE") {
        let rrule = prop
            .value
            .trim()
            .parse::<RRule<Unvalidated>>()
            .map_err(|err| ServiceError::ValidationError(err.to_string()))?;
        rrule
            .build(dt_start)
            .map_err(|err| ServiceError::ValidationError(err.to_string()))?
    } else {
        rdates.push(dt_start);
        RRuleSet::new(dt_start)
    };

    if !rdates.is_empty() {
        rrule_set = rrule_set.set_rdates(rdates);
    }

    let exdates: Vec<DateTime<Tz>> = date_list(component, "EXDATE", floating_tz)
        .iter()
        .map(|dt| dt.with_timezone(&Tz::UTC))
        .collect();
    if !exdates.is_empty() {
        rrule_set = rrule_set.set_exdates(exdates);
    }

    Ok(rrule_set)
}

/// ## Summary
/// Expands instance start times that may overlap `range`.
///
/// The lower bound is widened by `duration` so that an instance starting
/// before the window but still running inside it is returned. At most
/// `max_instances` starts are produced.
///
/// ## Errors
/// Returns `ValidationError` if the recurrence rule is invalid.
#[tracing::instrument(skip(component), fields(component = %component.name))]
pub fn expand_starts(
    component: &Component,
    dtstart: DateTime<Utc>,
    duration: Duration,
    range: &TimeRange,
    max_instances: u32,
    floating_tz: ZoneTz,
) -> ServiceResult<Vec<DateTime<Utc>>> {
    let mut rrule_set = build_rrule_set(component, dtstart, floating_tz)?;

    // An instance long enough to reach back past the earliest time leaves the
    // lower bound open.
    let inclusive_start = range.start.and_then(|start| {
        duration
            .abs()
            .checked_add(&Duration::seconds(1))
            .and_then(|lead| start.checked_sub_signed(lead))
    });
    if let Some(inclusive_start) = inclusive_start {
        rrule_set = rrule_set.after(inclusive_start.with_timezone(&Tz::UTC));
    }
    if let Some(end) = range.end {
        rrule_set = rrule_set.before(end.with_timezone(&Tz::UTC));
    }

    let limit = u16::try_from(max_instances).unwrap_or(u16::MAX);
    let result = rrule_set.all(limit);
    if result.limited {
        tracing::debug!(limit, "Recurrence expansion hit the instance cap");
    }

    let starts: Vec<DateTime<Utc>> = result
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        .collect();
    tracing::trace!(count = starts.len(), "Expanded recurrence instances");
    Ok(starts)
}
