// src/query.rs
//
// Read-only directional queries against the current snapshot. The camera
// frame is presented to the user mirrored, so the raw left third of the
// frame is the user's right. That inversion is deliberate; keep it.

use crate::types::ObjectSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDirection {
    Front,
    Left,
    Right,
}

impl QueryDirection {
    /// Map a free-form voice phrase to a direction.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        let phrase = phrase.to_lowercase();
        if phrase.contains("front") || phrase.contains("ahead") {
            Some(Self::Front)
        } else if phrase.contains("left") {
            Some(Self::Left)
        } else if phrase.contains("right") {
            Some(Self::Right)
        } else {
            None
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Front => "in front of you",
            Self::Left => "on your left",
            Self::Right => "on your right",
        }
    }
}

/// Answer "what's in front / on my left / on my right" from a snapshot.
pub fn respond(
    direction: QueryDirection,
    snapshot: &[ObjectSnapshot],
    frame_width: f32,
) -> String {
    if snapshot.is_empty() {
        return "I don't see anything right now.".to_string();
    }

    let lower = frame_width / 3.0;
    let upper = frame_width * 2.0 / 3.0;

    let matches: Vec<&ObjectSnapshot> = snapshot
        .iter()
        .filter(|obj| {
            let (cx, _) = obj.bbox.center();
            match direction {
                QueryDirection::Front => cx > lower && cx < upper,
                // Mirrored view: raw left third answers "right".
                QueryDirection::Right => cx < lower,
                QueryDirection::Left => cx > upper,
            }
        })
        .collect();

    if matches.is_empty() {
        return format!("There is nothing {}.", direction.label());
    }

    let items: Vec<String> = matches
        .iter()
        .map(|obj| {
            format!(
                "{} {} {:.1} meters away",
                indefinite_article(&obj.class),
                obj.class,
                obj.distance_m
            )
        })
        .collect();

    format!(
        "{}{}: {}.",
        direction.label()[..1].to_uppercase(),
        &direction.label()[1..],
        items.join(", ")
    )
}

fn indefinite_article(noun: &str) -> &'static str {
    match noun.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}
