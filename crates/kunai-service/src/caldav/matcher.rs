//! Evaluation of calendar-query filters against stored calendar data.
//!
//! A filter tree is matched against one calendar object at a time. The root
//! node is compared with the `VCALENDAR` itself; nested component filters are
//! satisfied when at least one child component of that name matches.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use kunai_core::config::DavConfig;
use kunai_rfc::rfc::dav::core::{CompFilter, ParamFilter, PropFilter, TimeRange};
use kunai_rfc::rfc::ical::core::{
    Component, ComponentKind, ICalDateTime, Property, parse_duration,
};

use super::recurrence;
use super::text_match::text_matches;

/// Evaluation settings shared by every node of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchContext {
    /// Cap on recurrence instances expanded per component.
    pub max_instances: u32,
    /// Zone used to read floating and DATE values.
    pub floating_tz: Tz,
}

impl MatchContext {
    #[must_use]
    pub fn from_config(config: &DavConfig) -> Self {
        Self {
            max_instances: config.max_instances,
            ..Self::default()
        }
    }
}

impl Default for MatchContext {
    fn default() -> Self {
        Self {
            max_instances: 1000,
            floating_tz: chrono_tz::UTC,
        }
    }
}

/// ## Summary
/// Returns whether a calendar object satisfies a filter tree.
///
/// The root filter names the top-level component, normally `VCALENDAR`.
#[tracing::instrument(skip_all, fields(root = %filter.name))]
pub fn matches(filter: &CompFilter, calendar: &Component, ctx: &MatchContext) -> bool {
    let present = calendar.name.eq_ignore_ascii_case(&filter.name);
    if filter.is_not_defined {
        return !present;
    }
    present && component_matches(filter, calendar, None, ctx)
}

/// Evaluates a filter node against `parent`'s children of the filtered name.
fn child_filter_matches(filter: &CompFilter, parent: &Component, ctx: &MatchContext) -> bool {
    let mut candidates = parent.children_named(&filter.name).peekable();
    if filter.is_not_defined {
        return candidates.peek().is_none();
    }
    candidates.any(|child| component_matches(filter, child, Some(parent), ctx))
}

fn component_matches(
    filter: &CompFilter,
    component: &Component,
    parent: Option<&Component>,
    ctx: &MatchContext,
) -> bool {
    if let Some(range) = &filter.time_range
        && !in_time_range(component, parent, range, ctx)
    {
        tracing::trace!(component = %component.name, "Time range rejected component");
        return false;
    }

    let props = filter
        .prop_filters
        .iter()
        .map(|pf| prop_filter_matches(pf, component, ctx));
    let comps = filter
        .comp_filters
        .iter()
        .map(|cf| child_filter_matches(cf, component, ctx));

    filter.test.combine(props.chain(comps))
}

fn prop_filter_matches(filter: &PropFilter, component: &Component, ctx: &MatchContext) -> bool {
    let mut props = component.get_properties(&filter.name).peekable();
    if filter.is_not_defined {
        return props.peek().is_none();
    }

    props.any(|prop| {
        let range = filter
            .time_range
            .iter()
            .map(|range| property_in_range(prop, range, ctx));
        let text = filter
            .text_match
            .iter()
            .map(|tm| text_matches(tm, &prop.text()));
        let params = filter
            .param_filters
            .iter()
            .map(|pf| param_filter_matches(pf, prop));

        filter.test.combine(range.chain(text).chain(params))
    })
}

fn param_filter_matches(filter: &ParamFilter, prop: &Property) -> bool {
    let param = prop.get_param(&filter.name);
    if filter.is_not_defined {
        return param.is_none();
    }
    let Some(param) = param else {
        return false;
    };

    match &filter.text_match {
        None => true,
        Some(tm) => param.values.iter().any(|value| text_matches(tm, value)),
    }
}

/// A DATE-TIME property falls in range when its instant does; a DATE covers
/// the whole day.
fn property_in_range(prop: &Property, range: &TimeRange, ctx: &MatchContext) -> bool {
    let Some(value) = ICalDateTime::from_property(prop) else {
        return false;
    };
    let Some(start) = value.to_utc(ctx.floating_tz) else {
        return false;
    };
    if value.is_date() {
        range.overlaps(start, start + Duration::days(1))
    } else {
        range.contains(start)
    }
}

/// ## Summary
/// Applies the per-component time-range rules of RFC 4791 §9.9.
///
/// Kinds without a defined rule only match an unbounded range.
fn in_time_range(
    component: &Component,
    parent: Option<&Component>,
    range: &TimeRange,
    ctx: &MatchContext,
) -> bool {
    match component.kind {
        Some(ComponentKind::Event) => event_in_range(component, parent, range, ctx),
        Some(ComponentKind::Todo) => todo_in_range(component, parent, range, ctx),
        Some(ComponentKind::Journal) => journal_in_range(component, parent, range, ctx),
        Some(ComponentKind::Alarm) => {
            parent.is_some_and(|parent| alarm_in_range(component, parent, range, ctx))
        }
        Some(ComponentKind::FreeBusy) => freebusy_in_range(component, range, ctx),
        _ => range.is_unbounded(),
    }
}

fn date_property(component: &Component, name: &str, ctx: &MatchContext) -> Option<ICalDateTime> {
    component
        .get_property(name)
        .and_then(ICalDateTime::from_property)
        .filter(|value| value.to_utc(ctx.floating_tz).is_some())
}

fn utc_property(component: &Component, name: &str, ctx: &MatchContext) -> Option<DateTime<Utc>> {
    date_property(component, name, ctx).and_then(|value| value.to_utc(ctx.floating_tz))
}

/// `t + d`, saturating at the representable bounds.
fn shift(t: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    t.checked_add_signed(d).unwrap_or(if d < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

fn duration_property(component: &Component) -> Option<Duration> {
    component
        .get_property("DURATION")
        .and_then(|prop| parse_duration(&prop.value))
}

/// ## Summary
/// Returns the instance starts of a component that may overlap `range`.
///
/// Non-recurring components yield their single start. Instances replaced by
/// a sibling carrying the same `UID` and a `RECURRENCE-ID` are dropped; the
/// override is evaluated on its own. A rule the recurrence engine rejects
/// degrades to the single start.
fn instance_starts(
    component: &Component,
    parent: Option<&Component>,
    dtstart: DateTime<Utc>,
    duration: Duration,
    range: &TimeRange,
    ctx: &MatchContext,
) -> Vec<DateTime<Utc>> {
    if !recurrence::is_recurring(component) {
        return vec![dtstart];
    }

    let mut starts = match recurrence::expand_starts(
        component,
        dtstart,
        duration,
        range,
        ctx.max_instances,
        ctx.floating_tz,
    ) {
        Ok(starts) => starts,
        Err(e) => {
            tracing::warn!(error = %e, uid = ?component.uid(), "Ignoring invalid recurrence rule");
            return vec![dtstart];
        }
    };

    if let (Some(parent), Some(uid)) = (parent, component.uid()) {
        let overridden: Vec<DateTime<Utc>> = parent
            .children_named(&component.name)
            .filter(|sibling| sibling.uid() == Some(uid))
            .filter_map(|sibling| utc_property(sibling, "RECURRENCE-ID", ctx))
            .collect();
        starts.retain(|start| !overridden.contains(start));
    }

    starts
}

fn event_in_range(
    component: &Component,
    parent: Option<&Component>,
    range: &TimeRange,
    ctx: &MatchContext,
) -> bool {
    let Some(dtstart) = date_property(component, "DTSTART", ctx) else {
        return false;
    };
    let Some(start) = dtstart.to_utc(ctx.floating_tz) else {
        return false;
    };

    let duration = if let Some(end) = utc_property(component, "DTEND", ctx) {
        end - start
    } else if let Some(duration) = duration_property(component) {
        duration
    } else if dtstart.is_date() {
        Duration::days(1)
    } else {
        Duration::zero()
    };
    let duration = duration.max(Duration::zero());

    instance_starts(component, parent, start, duration, range, ctx)
        .into_iter()
        .any(|s| range.overlaps(s, shift(s, duration)))
}

fn journal_in_range(
    component: &Component,
    parent: Option<&Component>,
    range: &TimeRange,
    ctx: &MatchContext,
) -> bool {
    let Some(dtstart) = date_property(component, "DTSTART", ctx) else {
        return false;
    };
    let Some(start) = dtstart.to_utc(ctx.floating_tz) else {
        return false;
    };
    let duration = if dtstart.is_date() {
        Duration::days(1)
    } else {
        Duration::zero()
    };

    instance_starts(component, parent, start, duration, range, ctx)
        .into_iter()
        .any(|s| range.overlaps(s, shift(s, duration)))
}

/// The VTODO table of RFC 4791 §9.9, evaluated per instance.
fn todo_in_range(
    component: &Component,
    parent: Option<&Component>,
    range: &TimeRange,
    ctx: &MatchContext,
) -> bool {
    let start = range.start.unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = range.end.unwrap_or(DateTime::<Utc>::MAX_UTC);

    let dtstart = utc_property(component, "DTSTART", ctx);
    let due = utc_property(component, "DUE", ctx);
    let duration = duration_property(component);
    let completed = utc_property(component, "COMPLETED", ctx);
    let created = utc_property(component, "CREATED", ctx);

    let Some(dtstart) = dtstart else {
        return match (due, completed, created) {
            (Some(due), _, _) => start < due && end >= due,
            (None, Some(completed), Some(created)) => {
                (start <= created || start <= completed) && (end >= created || end >= completed)
            }
            (None, Some(completed), None) => start <= completed && end >= completed,
            (None, None, Some(created)) => end > created,
            (None, None, None) => true,
        };
    };

    let span = match (duration, due) {
        (Some(duration), _) => Some(duration.max(Duration::zero())),
        (None, Some(due)) => Some((due - dtstart).max(Duration::zero())),
        (None, None) => None,
    };

    instance_starts(component, parent, dtstart, span.unwrap_or_else(Duration::zero), range, ctx)
        .into_iter()
        .any(|s| match (duration, span.map(|span| shift(s, span))) {
            (Some(_), Some(until)) => start <= until && (end > s || end >= until),
            (None, Some(until)) => (start < until || start <= s) && (end > s || end >= until),
            _ => start <= s && end > s,
        })
}

/// ## Summary
/// Tests whether any trigger time of an alarm falls in range.
///
/// Relative triggers are anchored on the parent's start or, with
/// `RELATED=END`, on its end. `REPEAT` and `DURATION` add further triggers,
/// at most `max_instances` of them. For a recurring parent every expanded
/// instance contributes triggers.
fn alarm_in_range(
    component: &Component,
    parent: &Component,
    range: &TimeRange,
    ctx: &MatchContext,
) -> bool {
    let Some(trigger) = component.get_property("TRIGGER") else {
        return false;
    };

    let repeat = component
        .get_property("REPEAT")
        .and_then(|prop| prop.value.trim().parse::<u32>().ok())
        .unwrap_or(0);
    let interval = duration_property(component).unwrap_or_else(Duration::zero);
    // Without an interval every repetition fires at the first trigger.
    let repeat = if interval.is_zero() {
        0
    } else {
        repeat.min(ctx.max_instances)
    };
    let repeats = move |first: DateTime<Utc>| {
        (0..=repeat).map_while(move |n| {
            let step = interval.checked_mul(i32::try_from(n).ok()?)?;
            first.checked_add_signed(step)
        })
    };

    let absolute = trigger
        .param_value("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE-TIME"));
    if absolute {
        let Some(at) = ICalDateTime::from_property(trigger).and_then(|v| v.to_utc(ctx.floating_tz))
        else {
            return false;
        };
        return repeats(at).any(|t| range.contains(t));
    }

    let Some(offset) = parse_duration(&trigger.value) else {
        return false;
    };
    let Some(parent_start) = utc_property(parent, "DTSTART", ctx) else {
        return false;
    };

    let related_end = trigger
        .param_value("RELATED")
        .is_some_and(|v| v.eq_ignore_ascii_case("END"));
    let parent_span = if let Some(end) =
        utc_property(parent, "DTEND", ctx).or_else(|| utc_property(parent, "DUE", ctx))
    {
        end - parent_start
    } else {
        duration_property(parent).unwrap_or_else(Duration::zero)
    };
    let anchor_shift = if related_end { parent_span } else { Duration::zero() };

    // Triggers beyond the representable range never fire.
    let Some(lead) = anchor_shift.checked_add(&offset) else {
        return false;
    };
    let reach = i32::try_from(repeat)
        .ok()
        .and_then(|n| interval.checked_mul(n))
        .and_then(|tail| lead.checked_add(&tail));

    // Parent instances whose triggers can land in range.
    let window = TimeRange::new(
        range.start.zip(reach).and_then(|(s, reach)| s.checked_sub_signed(reach)),
        range.end.and_then(|e| e.checked_sub_signed(lead)),
    );

    instance_starts(parent, None, parent_start, Duration::zero(), &window, ctx)
        .into_iter()
        .filter_map(|s| s.checked_add_signed(lead))
        .flat_map(repeats)
        .any(|t| range.contains(t))
}

/// `FREEBUSY` periods, or the DTSTART/DTEND span when there are none.
fn freebusy_in_range(component: &Component, range: &TimeRange, ctx: &MatchContext) -> bool {
    let mut periods = component
        .get_properties("FREEBUSY")
        .flat_map(|prop| prop.value.split(','))
        .filter_map(|period| parse_period(period, ctx))
        .peekable();

    if periods.peek().is_some() {
        return periods.any(|(s, e)| range.overlaps(s, e));
    }

    match (
        utc_property(component, "DTSTART", ctx),
        utc_property(component, "DTEND", ctx),
    ) {
        (Some(s), Some(e)) => range.overlaps(s, e),
        _ => false,
    }
}

fn parse_period(period: &str, ctx: &MatchContext) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, rest) = period.trim().split_once('/')?;
    let start = ICalDateTime::parse(start, None)?.to_utc(ctx.floating_tz)?;
    let end = if rest.starts_with(['P', '+', '-']) {
        shift(start, parse_duration(rest)?)
    } else {
        ICalDateTime::parse(rest, None)?.to_utc(ctx.floating_tz)?
    };
    Some((start, end))
}
