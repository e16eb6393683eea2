//! Building filter queries from command-line arguments.
//!
//! Conditions are written `property:operator[:value]`, for example
//! `tags:contains:work`, `due:is-on-or-before:today` or `due:is-empty`.
//! User fields keep their prefix: `user:effort:is-greater-than:3`. A value
//! with commas becomes a list (`tags:contains:work,home`).

use chrono::NaiveDate;
use taskview_core::filter::{
    parse_relative_date, property_definition, search_term, set_search_term, strip_search,
    Conjunction, FilterCondition, FilterGroup, FilterOperator, FilterQuery, FilterValue,
    PropertyId, USER_PROPERTY_PREFIX,
};
use taskview_core::SavedViews;
use taskview_model::date::{add_days, parse_calendar_date};
use taskview_model::models::UserFieldDefinition;

use super::{CommandError, Result};
use crate::cli::FilterArgs;

/// Resolves a date argument against `today`.
pub fn parse_day(text: &str, today: NaiveDate) -> Result<NaiveDate> {
    parse_relative_date(text)
        .map(|offset| add_days(today, offset))
        .or_else(|| parse_calendar_date(text))
        .ok_or_else(|| CommandError::InvalidDate(text.to_string()))
}

/// Resolves an optional date argument, defaulting to `today`.
pub fn parse_day_or_today(text: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    text.map_or(Ok(today), |t| parse_day(t, today))
}

/// Splits `spec` into property id and the remainder after it.
fn split_property(spec: &str) -> Option<(&str, &str)> {
    let split_at = if spec.starts_with(USER_PROPERTY_PREFIX) {
        let after = &spec[USER_PROPERTY_PREFIX.len()..];
        USER_PROPERTY_PREFIX.len() + after.find(':')?
    } else {
        spec.find(':')?
    };
    Some((&spec[..split_at], &spec[split_at + 1..]))
}

/// Parses one `property:operator[:value]` condition.
pub fn parse_condition(spec: &str, user_fields: &[UserFieldDefinition]) -> Result<FilterCondition> {
    let (property, rest) = split_property(spec.trim()).ok_or_else(|| {
        CommandError::Filter(format!(
            "invalid condition '{}'. Expected property:operator[:value]",
            spec
        ))
    })?;
    let (operator, value) = match rest.split_once(':') {
        Some((operator, value)) => (operator, value.trim()),
        None => (rest, ""),
    };

    let property = PropertyId::from(property);
    let definition = property_definition(&property, user_fields)
        .ok_or_else(|| CommandError::Filter(format!("unknown property '{}'", property)))?;

    let operator = FilterOperator::from(operator);
    if !definition.supports(&operator) {
        let valid: Vec<&str> = definition.operators.iter().map(FilterOperator::as_str).collect();
        return Err(CommandError::Filter(format!(
            "operator '{}' does not apply to {}. Valid operators: {}",
            operator,
            property,
            valid.join(", ")
        )));
    }

    let value = match (operator.requires_value(), value.is_empty()) {
        (false, true) => FilterValue::None,
        (false, false) => {
            return Err(CommandError::Filter(format!("operator '{}' takes no value", operator)));
        }
        (true, true) => {
            return Err(CommandError::Filter(format!("operator '{}' needs a value", operator)));
        }
        (true, false) if value.contains(',') => {
            FilterValue::List(value.split(',').map(|v| v.trim().to_string()).collect())
        }
        (true, false) => FilterValue::Text(value.to_string()),
    };

    let condition = FilterCondition::new(property, operator, value);
    if !condition.is_complete_with(user_fields) {
        return Err(CommandError::Filter(format!("value '{}' does not fit {}", spec, definition.label)));
    }
    Ok(condition)
}

/// Builds the query described by `args`.
///
/// Starts from the named saved view (or the empty query), narrows it by the
/// given conditions and splices in the search term last. A `--search` term
/// replaces the view's own term; without one the view's term is kept.
pub fn build_query(
    args: &FilterArgs,
    views: &SavedViews,
    user_fields: &[UserFieldDefinition],
) -> Result<FilterQuery> {
    let (mut query, view_term) = match &args.view {
        Some(name) => {
            let view = &views.find_by_name(name)?.query;
            (strip_search(view), search_term(view).map(str::to_string))
        }
        None => (FilterQuery::default(), None),
    };

    let conditions = args
        .conditions
        .iter()
        .map(|spec| parse_condition(spec, user_fields))
        .collect::<Result<Vec<_>>>()?;

    if !conditions.is_empty() {
        let conjunction = if args.any { Conjunction::Or } else { Conjunction::And };
        if query.root.children.is_empty() {
            query.root.conjunction = conjunction;
            query.root.children = conditions.into_iter().map(Into::into).collect();
        } else {
            let added = conditions
                .into_iter()
                .fold(FilterGroup::new(conjunction), FilterGroup::with_child);
            let mut base = FilterGroup::new(query.root.conjunction);
            base.children = std::mem::take(&mut query.root.children);
            query.root.conjunction = Conjunction::And;
            query.root.children = vec![base.into(), added.into()];
        }
    }

    // The search condition stays a direct child of the root: the view's term
    // is split off above and only one term is put back.
    if let Some(term) = args.search.as_deref().or(view_term.as_deref()) {
        query = set_search_term(&query, term);
    }
    tracing::debug!(conditions = args.conditions.len(), "built filter query");
    Ok(query)
}
