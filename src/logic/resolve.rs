use crate::model::{AttributeValue, Scope};

/// Specificity score of a candidate value against a requested scope.
///
/// Weights (kept integral by doubling the 0.5-step channel weights):
///   locale exact match        +4
///   locale set but different  +2
///   locale global (null)      +0
///   channel exact match       +2
///   channel set but different +1
///   channel global (null)     +0
///
/// A locale-exact match therefore always beats any channel-only match, and a
/// channel-exact match beats a foreign-locale match only on the channel axis.
fn specificity(value: &AttributeValue, scope: &Scope) -> u8 {
    let locale_score = match (&value.locale, &scope.locale) {
        (Some(have), Some(want)) if have == want => 4,
        (Some(_), _) => 2,
        (None, _) => 0,
    };
    let channel_score = match (&value.channel, &scope.channel) {
        (Some(have), Some(want)) if have == want => 2,
        (Some(_), _) => 1,
        (None, _) => 0,
    };
    locale_score + channel_score
}

/// Pick the most specific stored value for `attribute_id` among `values`,
/// relative to the requested scope. Returns `None` when the attribute has no
/// value at all (eligible for "add" actions).
///
/// Ties keep the first-seen candidate: the scan uses strict `>`, so repeated
/// calls with the same input always return the same row.
pub fn resolve<'a>(
    values: &'a [AttributeValue],
    attribute_id: &str,
    scope: &Scope,
) -> Option<&'a AttributeValue> {
    let mut best: Option<(&AttributeValue, u8)> = None;
    for value in values.iter().filter(|v| v.attribute_id == attribute_id) {
        let score = specificity(value, scope);
        match best {
            Some((_, best_score)) if score > best_score => best = Some((value, score)),
            None => best = Some((value, score)),
            _ => {}
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueBody;
    use chrono::Utc;

    fn value(id: &str, attribute: &str, locale: Option<&str>, channel: Option<&str>) -> AttributeValue {
        AttributeValue {
            id: id.to_string(),
            attribute_id: attribute.to_string(),
            body: ValueBody::Text {
                value: id.to_string(),
            },
            locale: locale.map(str::to_string),
            channel: channel.map(str::to_string),
            updated_at: Utc::now(),
        }
    }

    fn scope(locale: Option<&str>, channel: Option<&str>) -> Scope {
        Scope::new(locale.map(str::to_string), channel.map(str::to_string))
    }

    #[test]
    fn no_candidates_yields_none() {
        let values = vec![value("v1", "other", Some("en"), None)];
        assert!(resolve(&values, "color", &scope(Some("en"), None)).is_none());
    }

    #[test]
    fn locale_exact_beats_channel_exact_beats_global() {
        let values = vec![
            value("global", "color", None, None),
            value("channel", "color", None, Some("web")),
            value("locale", "color", Some("en"), None),
        ];
        let hit = resolve(&values, "color", &scope(Some("en"), Some("web"))).unwrap();
        assert_eq!(hit.id, "locale");

        // Without the locale-scoped row the channel row wins over global.
        let hit = resolve(&values[..2], "color", &scope(Some("en"), Some("web"))).unwrap();
        assert_eq!(hit.id, "channel");
    }

    #[test]
    fn foreign_locale_still_beats_global() {
        let values = vec![
            value("a", "color", Some("fr"), None),
            value("b", "color", None, None),
        ];
        let hit = resolve(&values, "color", &scope(Some("fr"), Some("web"))).unwrap();
        assert_eq!(hit.id, "a");
    }

    #[test]
    fn tie_keeps_first_seen_and_is_deterministic() {
        // Two rows with identical specificity relative to the request.
        let values = vec![
            value("first", "color", Some("de"), None),
            value("second", "color", Some("sv"), None),
        ];
        for _ in 0..10 {
            let hit = resolve(&values, "color", &scope(Some("en"), None)).unwrap();
            assert_eq!(hit.id, "first");
        }

        // Reversed input order flips the winner: insertion order is the
        // tie-break signal.
        let reversed: Vec<_> = values.iter().rev().cloned().collect();
        let hit = resolve(&reversed, "color", &scope(Some("en"), None)).unwrap();
        assert_eq!(hit.id, "second");
    }

    #[test]
    fn exact_scope_match_wins_over_partial() {
        let values = vec![
            value("partial", "color", Some("en"), None),
            value("exact", "color", Some("en"), Some("web")),
        ];
        let hit = resolve(&values, "color", &scope(Some("en"), Some("web"))).unwrap();
        assert_eq!(hit.id, "exact");
    }
}
