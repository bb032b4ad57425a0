//! Stretch catalog types, filtering, and random selection.

mod catalog;

pub use catalog::{builtin, muscle_groups};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timer::SWITCH_SECONDS;

/// How many sides a stretch has: one, or two with a switch in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Sides {
    #[default]
    One,
    Two,
}

impl Sides {
    pub fn count(self) -> u8 {
        match self {
            Sides::One => 1,
            Sides::Two => 2,
        }
    }
}

impl TryFrom<u8> for Sides {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Sides::One),
            2 => Ok(Sides::Two),
            other => Err(ValidationError::InvalidValue {
                field: "sides".into(),
                message: format!("expected 1 or 2, got {other}"),
            }),
        }
    }
}

impl From<Sides> for u8 {
    fn from(sides: Sides) -> u8 {
        sides.count()
    }
}

/// One reaction per stretch, mirroring the four reaction buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Love,
    Like,
    Dislike,
    Hate,
}

impl Reaction {
    pub fn as_str(self) -> &'static str {
        match self {
            Reaction::Love => "love",
            Reaction::Like => "like",
            Reaction::Dislike => "dislike",
            Reaction::Hate => "hate",
        }
    }
}

impl std::str::FromStr for Reaction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "love" => Ok(Reaction::Love),
            "like" => Ok(Reaction::Like),
            "dislike" => Ok(Reaction::Dislike),
            "hate" => Ok(Reaction::Hate),
            other => Err(ValidationError::InvalidValue {
                field: "reaction".into(),
                message: format!("expected love|like|dislike|hate, got '{other}'"),
            }),
        }
    }
}

/// A single stretch exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stretch {
    pub id: i64,
    pub name: String,
    pub muscle_groups: Vec<String>,
    /// Seconds to hold one side.
    pub seconds_per_side: u64,
    #[serde(default)]
    pub sides: Sides,
    /// Movement-based rather than a held position.
    pub dynamic: bool,
    #[serde(default)]
    pub description: String,
}

impl Stretch {
    /// Wall time for the whole stretch, switch window included.
    pub fn total_seconds(&self) -> u64 {
        match self.sides {
            Sides::Two => self
                .seconds_per_side
                .saturating_mul(2)
                .saturating_add(SWITCH_SECONDS),
            Sides::One => self.seconds_per_side,
        }
    }

    /// Human label like "30 seconds per side".
    pub fn duration_label(&self) -> String {
        match self.sides {
            Sides::Two => format!("{} seconds per side", self.seconds_per_side),
            Sides::One => format!("{} seconds", self.seconds_per_side),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StretchKind {
    #[default]
    All,
    Dynamic,
    Static,
}

impl std::str::FromStr for StretchKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StretchKind::All),
            "dynamic" => Ok(StretchKind::Dynamic),
            "static" => Ok(StretchKind::Static),
            other => Err(ValidationError::InvalidValue {
                field: "kind".into(),
                message: format!("expected all|dynamic|static, got '{other}'"),
            }),
        }
    }
}

/// Catalog filters. Empty/None fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub min_seconds: Option<u64>,
    #[serde(default)]
    pub max_seconds: Option<u64>,
    #[serde(default)]
    pub kind: StretchKind,
}

impl Filters {
    pub fn matches(&self, stretch: &Stretch) -> bool {
        if !self.muscle_groups.is_empty()
            && !self
                .muscle_groups
                .iter()
                .any(|group| stretch.muscle_groups.iter().any(|m| m == group))
        {
            return false;
        }
        if let Some(min) = self.min_seconds {
            if stretch.seconds_per_side < min {
                return false;
            }
        }
        if let Some(max) = self.max_seconds {
            if stretch.seconds_per_side > max {
                return false;
            }
        }
        match self.kind {
            StretchKind::Dynamic => stretch.dynamic,
            StretchKind::Static => !stretch.dynamic,
            StretchKind::All => true,
        }
    }

    pub fn apply<'a>(&self, stretches: &'a [Stretch]) -> Vec<&'a Stretch> {
        stretches.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Uniform pick from a filtered pool. `None` when the pool is empty.
pub fn pick_random<R: rand::Rng>(rng: &mut R, pool: &[&Stretch]) -> Option<Stretch> {
    use rand::seq::SliceRandom;
    pool.choose(rng).map(|s| (*s).clone())
}

/// Uniform pick from the whole catalog after filtering.
pub fn random_stretch(stretches: &[Stretch], filters: &Filters) -> Option<Stretch> {
    pick_random(&mut rand::thread_rng(), &filters.apply(stretches))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stretch(id: i64, groups: &[&str], seconds: u64, dynamic: bool) -> Stretch {
        Stretch {
            id,
            name: format!("Stretch {id}"),
            muscle_groups: groups.iter().map(|g| g.to_string()).collect(),
            seconds_per_side: seconds,
            sides: Sides::One,
            dynamic,
            description: String::new(),
        }
    }

    #[test]
    fn sides_rejects_out_of_range() {
        assert!(Sides::try_from(1).is_ok());
        assert!(Sides::try_from(2).is_ok());
        assert!(Sides::try_from(0).is_err());
        assert!(Sides::try_from(3).is_err());
    }

    #[test]
    fn total_seconds_includes_switch_window() {
        let mut s = stretch(1, &["neck"], 30, false);
        assert_eq!(s.total_seconds(), 30);
        s.sides = Sides::Two;
        assert_eq!(s.total_seconds(), 63);
    }

    #[test]
    fn filters_by_muscle_group() {
        let pool = vec![
            stretch(1, &["neck"], 30, false),
            stretch(2, &["hips", "glutes"], 30, false),
        ];
        let filters = Filters {
            muscle_groups: vec!["glutes".into()],
            ..Filters::default()
        };
        let hits = filters.apply(&pool);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn filters_by_duration_range() {
        let pool = vec![
            stretch(1, &["neck"], 20, false),
            stretch(2, &["neck"], 45, false),
            stretch(3, &["neck"], 90, false),
        ];
        let filters = Filters {
            min_seconds: Some(30),
            max_seconds: Some(60),
            ..Filters::default()
        };
        let hits = filters.apply(&pool);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn filters_by_kind() {
        let pool = vec![
            stretch(1, &["neck"], 30, true),
            stretch(2, &["neck"], 30, false),
        ];
        let dynamic = Filters {
            kind: StretchKind::Dynamic,
            ..Filters::default()
        };
        let r#static = Filters {
            kind: StretchKind::Static,
            ..Filters::default()
        };
        assert_eq!(dynamic.apply(&pool)[0].id, 1);
        assert_eq!(r#static.apply(&pool)[0].id, 2);
    }

    #[test]
    fn pick_random_is_uniform_over_the_pool() {
        use rand::SeedableRng;

        let pool = vec![
            stretch(1, &["neck"], 30, false),
            stretch(2, &["neck"], 30, false),
        ];
        let refs = Filters::default().apply(&pool);
        let mut rng = rand_pcg::Pcg64::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            seen.insert(pick_random(&mut rng, &refs).unwrap().id);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn pick_random_from_empty_pool_is_none() {
        let mut rng = rand::thread_rng();
        assert!(pick_random(&mut rng, &[]).is_none());
    }
}
