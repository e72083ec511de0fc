use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::{BitOr, BitOrAssign},
    str::FromStr,
};

/// The weekdays a course meets on, Monday through Friday.
///
/// Serialized as a five element boolean array (`[mon, tue, wed, thu, fri]`)
/// and stored as a day pattern such as `"MWF"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[bool; 5]", into = "[bool; 5]")]
#[repr(transparent)]
pub struct MeetDays(u8);

impl MeetDays {
    pub const MONDAY: Self = MeetDays(1 << 0);
    pub const TUESDAY: Self = MeetDays(1 << 1);
    pub const WEDNESDAY: Self = MeetDays(1 << 2);
    pub const THURSDAY: Self = MeetDays(1 << 3);
    pub const FRIDAY: Self = MeetDays(1 << 4);

    pub const NONE: Self = MeetDays(0);

    /// Day-to-char mapping for parsing and display, in array order
    const DAY_CHARS: [(Self, char); 5] = [
        (Self::MONDAY, 'M'),
        (Self::TUESDAY, 'T'),
        (Self::WEDNESDAY, 'W'),
        (Self::THURSDAY, 'R'),
        (Self::FRIDAY, 'F'),
    ];

    pub fn contains(self, day: Self) -> bool {
        (self.0 & day.0) == day.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn set(&mut self, day: Self, value: bool) {
        if value {
            *self |= day;
        } else {
            self.0 &= !day.0;
        }
    }
}

impl From<[bool; 5]> for MeetDays {
    fn from(mask: [bool; 5]) -> Self {
        let mut days = Self::NONE;
        for (&(day, _), selected) in Self::DAY_CHARS.iter().zip(mask) {
            days.set(day, selected);
        }
        days
    }
}

impl From<MeetDays> for [bool; 5] {
    fn from(days: MeetDays) -> Self {
        MeetDays::DAY_CHARS.map(|(day, _)| days.contains(day))
    }
}

impl FromStr for MeetDays {
    type Err = ();

    fn from_str(days: &str) -> Result<Self, Self::Err> {
        let mut result = Self::NONE;

        for c in days.chars() {
            let (day, _) = Self::DAY_CHARS
                .iter()
                .find(|(_, day_char)| *day_char == c)
                .ok_or(())?;
            result |= *day;
        }

        Ok(result)
    }
}

impl Display for MeetDays {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut result = String::new();

        for &(day, day_char) in &Self::DAY_CHARS {
            if self.contains(day) {
                result.push(day_char);
            }
        }

        write!(f, "{result}")
    }
}

impl BitOr for MeetDays {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        MeetDays(self.0 | rhs.0)
    }
}

impl BitOrAssign for MeetDays {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(feature = "database")]
impl_string_value!(MeetDays);

#[cfg(test)]
mod test {
    use crate::days::MeetDays;
    use std::str::FromStr;

    #[test]
    fn test_meet_days_from_str() {
        let days = MeetDays::from_str("MWF").unwrap();
        assert!(days.contains(MeetDays::MONDAY));
        assert!(!days.contains(MeetDays::TUESDAY));
        assert!(days.contains(MeetDays::WEDNESDAY));
        assert!(!days.contains(MeetDays::THURSDAY));
        assert!(days.contains(MeetDays::FRIDAY));
    }

    #[test]
    fn test_meet_days_rejects_weekend_chars() {
        assert!(MeetDays::from_str("MS").is_err());
        assert_eq!(MeetDays::from_str(""), Ok(MeetDays::NONE));
    }

    #[test]
    fn test_meet_days_display() {
        let days = MeetDays::TUESDAY | MeetDays::THURSDAY;
        assert_eq!(days.to_string(), "TR");
        assert_eq!(MeetDays::from([true; 5]).to_string(), "MTWRF");
    }

    #[test]
    fn test_meet_days_bool_mask() {
        let days = MeetDays::from([true, false, true, false, false]);
        assert_eq!(days, MeetDays::MONDAY | MeetDays::WEDNESDAY);

        let mask: [bool; 5] = days.into();
        assert_eq!(mask, [true, false, true, false, false]);

        assert!(MeetDays::from([false; 5]).is_empty());
    }

    #[test]
    fn test_meet_days_set_clears_single_day() {
        let mut days = MeetDays::from([true; 5]);
        days.set(MeetDays::MONDAY, false);
        assert_eq!(days.to_string(), "TWRF");
        days.set(MeetDays::MONDAY, true);
        assert_eq!(days.to_string(), "MTWRF");
    }

    #[test]
    fn test_meet_days_serde_as_array() {
        let days: MeetDays = serde_json::from_str("[false,true,false,true,false]").unwrap();
        assert_eq!(days.to_string(), "TR");
        assert_eq!(
            serde_json::to_string(&MeetDays::FRIDAY).unwrap(),
            "[false,false,false,false,true]"
        );
    }
}
