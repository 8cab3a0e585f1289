use serde::{Deserialize, Serialize};
use std::fmt;

/// Session grade, best first.
///
/// `Unknown` only ever comes out of deserialising a label this build does
/// not recognise; the scorer never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rank {
    S,
    A,
    B,
    C,
    D,
    E,
    Unknown,
}

impl Rank {
    /// Grades a session. First matching rule wins.
    ///
    /// The trailing `E` is unreachable for correct counts 0..=3 and is kept
    /// as the fallback grade.
    pub fn from_score(correct_count: usize, avg_time_ms: Option<u64>) -> Rank {
        let within = |limit: u64| avg_time_ms.is_some_and(|t| t <= limit);
        if correct_count == 3 && within(200) {
            Rank::S
        } else if correct_count == 3 && within(300) {
            Rank::A
        } else if correct_count >= 2 && within(400) {
            Rank::B
        } else if correct_count >= 1 {
            Rank::C
        } else if correct_count == 0 {
            Rank::D
        } else {
            Rank::E
        }
    }

    /// Lower is better.
    pub fn priority(&self) -> u32 {
        match self {
            Rank::S => 1,
            Rank::A => 2,
            Rank::B => 3,
            Rank::C => 4,
            Rank::D => 5,
            Rank::E => 6,
            Rank::Unknown => 999,
        }
    }

    pub fn comment(&self) -> &'static str {
        match self {
            Rank::S => "見えない速さ。もはや反応ではなく予知！🔮",
            Rank::A => "君なら高速で飛ぶ蚊もつぶせるよ！🦟💥",
            Rank::B => "おぉ、いい線いってる！でもまだ猫には勝てないかも😼",
            Rank::C => "のんびり反応。眠そうだった？😪",
            Rank::D => "カメよりは速い…いや、カメの勝ちかも？🐢💨",
            Rank::E | Rank::Unknown => "それはもう芸術的なスローモーションだったよ…🎥🕰️",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rank::S => "S",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
            Rank::E => "E",
            Rank::Unknown => "?",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for Rank {
    fn from(label: &str) -> Self {
        match label {
            "S" => Rank::S,
            "A" => Rank::A,
            "B" => Rank::B,
            "C" => Rank::C,
            "D" => Rank::D,
            "E" => Rank::E,
            _ => Rank::Unknown,
        }
    }
}

impl From<String> for Rank {
    fn from(label: String) -> Self {
        Rank::from(label.as_str())
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grading_table() {
        assert_eq!(Rank::from_score(3, Some(200)), Rank::S);
        assert_eq!(Rank::from_score(3, Some(250)), Rank::A);
        assert_eq!(Rank::from_score(3, Some(301)), Rank::B);
        assert_eq!(Rank::from_score(2, Some(400)), Rank::B);
        assert_eq!(Rank::from_score(2, Some(401)), Rank::C);
        assert_eq!(Rank::from_score(1, Some(9999)), Rank::C);
        assert_eq!(Rank::from_score(0, None), Rank::D);
    }

    #[test]
    fn all_correct_but_slow_is_c() {
        assert_eq!(Rank::from_score(3, Some(450)), Rank::C);
    }

    #[test]
    fn priority_is_total() {
        let order = [
            Rank::S,
            Rank::A,
            Rank::B,
            Rank::C,
            Rank::D,
            Rank::E,
            Rank::Unknown,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].priority() < pair[1].priority());
        }
        assert_eq!(Rank::Unknown.priority(), 999);
    }

    #[test]
    fn unknown_labels_parse_to_unknown() {
        assert_eq!(Rank::from("Z"), Rank::Unknown);
        assert_eq!(Rank::from(""), Rank::Unknown);
        assert_eq!(Rank::from("A"), Rank::A);
    }

    #[test]
    fn serde_uses_plain_labels() {
        let json = serde_json::to_string(&Rank::B).unwrap();
        assert_eq!(json, "\"B\"");
        let back: Rank = serde_json::from_str("\"X\"").unwrap();
        assert_eq!(back, Rank::Unknown);
    }

    #[test]
    fn every_rank_has_a_comment() {
        assert_eq!(Rank::S.comment(), "見えない速さ。もはや反応ではなく予知！🔮");
        assert_eq!(Rank::D.comment(), "カメよりは速い…いや、カメの勝ちかも？🐢💨");
        assert_eq!(Rank::E.comment(), Rank::Unknown.comment());
    }
}
