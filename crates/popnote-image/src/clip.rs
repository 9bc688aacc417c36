//! Fitting a single line of text into a pixel budget.

use std::fmt;
use std::str::FromStr;

/// How text that does not fit its budget is shortened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClipMode {
    /// Drop characters from the end.
    #[default]
    Truncate,
    /// Drop characters from the start, then prepend the ellipsis.
    EllipsisStart,
    /// Drop characters around the middle, then splice in the ellipsis.
    EllipsisMiddle,
    /// Drop characters from the end, then append the ellipsis.
    EllipsisEnd,
}

impl ClipMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ClipMode::Truncate => "truncate",
            ClipMode::EllipsisStart => "ellipsis-start",
            ClipMode::EllipsisMiddle => "ellipsis-middle",
            ClipMode::EllipsisEnd => "ellipsis-end",
        }
    }
}

impl fmt::Display for ClipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClipMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "truncate" => Ok(ClipMode::Truncate),
            "ellipsis-start" => Ok(ClipMode::EllipsisStart),
            "ellipsis-middle" => Ok(ClipMode::EllipsisMiddle),
            "ellipsis-end" => Ok(ClipMode::EllipsisEnd),
            other => Err(format!("unknown clipping mode '{other}'")),
        }
    }
}

/// Shorten `text` until `measure(text) + offset` fits in `budget`.
///
/// Characters are removed one at a time and the remainder re-measured. For
/// the ellipsis modes the width of `ellipsis` counts against the budget and
/// the ellipsis is inserted once the loop stops. Text that already fits is
/// returned unchanged.
pub fn clip_text<F>(
    text: &str,
    mode: ClipMode,
    budget: u32,
    offset: u32,
    ellipsis: &str,
    measure: F,
) -> String
where
    F: Fn(&str) -> u32,
{
    let fits = |s: &str, extra: u32| {
        measure(s).saturating_add(offset).saturating_add(extra) <= budget
    };

    if fits(text, 0) {
        return text.to_string();
    }

    let mut chars: Vec<char> = text.chars().collect();
    match mode {
        ClipMode::Truncate => {
            while !chars.is_empty() && !fits(&collect(&chars), 0) {
                chars.pop();
            }
            collect(&chars)
        }
        ClipMode::EllipsisEnd => {
            let extra = measure(ellipsis);
            while !chars.is_empty() && !fits(&collect(&chars), extra) {
                chars.pop();
            }
            let mut out = collect(&chars);
            out.push_str(ellipsis);
            out
        }
        ClipMode::EllipsisStart => {
            let extra = measure(ellipsis);
            while !chars.is_empty() && !fits(&collect(&chars), extra) {
                chars.remove(0);
            }
            let mut out = ellipsis.to_string();
            out.push_str(&collect(&chars));
            out
        }
        ClipMode::EllipsisMiddle => {
            let extra = measure(ellipsis);
            let mut cut = chars.len() / 2;
            let mut take_left = true;
            while !chars.is_empty() && !fits(&collect(&chars), extra) {
                if take_left && cut > 0 {
                    cut -= 1;
                    chars.remove(cut);
                } else if cut < chars.len() {
                    chars.remove(cut);
                } else {
                    cut -= 1;
                    chars.remove(cut);
                }
                take_left = !take_left;
            }
            let mut out = collect(&chars[..cut]);
            out.push_str(ellipsis);
            out.push_str(&collect(&chars[cut..]));
            out
        }
    }
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 10px wide.
    fn mono(s: &str) -> u32 {
        s.chars().count() as u32 * 10
    }

    const ELLIPSIS: &str = "…";

    #[test]
    fn fitting_text_is_untouched() {
        for mode in [
            ClipMode::Truncate,
            ClipMode::EllipsisStart,
            ClipMode::EllipsisMiddle,
            ClipMode::EllipsisEnd,
        ] {
            assert_eq!(clip_text("hello", mode, 50, 0, ELLIPSIS, mono), "hello");
        }
    }

    #[test]
    fn truncate_drops_the_end() {
        assert_eq!(clip_text("abcdefgh", ClipMode::Truncate, 50, 0, ELLIPSIS, mono), "abcde");
    }

    #[test]
    fn offset_counts_against_budget() {
        assert_eq!(clip_text("abcdefgh", ClipMode::Truncate, 50, 20, ELLIPSIS, mono), "abc");
    }

    #[test]
    fn ellipsis_end() {
        assert_eq!(
            clip_text("abcdefgh", ClipMode::EllipsisEnd, 50, 0, ELLIPSIS, mono),
            "abcd…"
        );
    }

    #[test]
    fn ellipsis_start() {
        assert_eq!(
            clip_text("abcdefgh", ClipMode::EllipsisStart, 50, 0, ELLIPSIS, mono),
            "…efgh"
        );
    }

    #[test]
    fn ellipsis_middle_keeps_both_ends() {
        let clipped = clip_text("abcdefghij", ClipMode::EllipsisMiddle, 50, 0, ELLIPSIS, mono);
        assert_eq!(mono(&clipped), 50);
        assert!(clipped.starts_with("ab"));
        assert!(clipped.ends_with("ij"));
        assert_eq!(clipped.chars().filter(|c| *c == '…').count(), 1);
    }

    #[test]
    fn zero_budget_terminates() {
        assert_eq!(clip_text("abc", ClipMode::Truncate, 0, 0, ELLIPSIS, mono), "");
        assert_eq!(clip_text("abc", ClipMode::EllipsisMiddle, 0, 0, ELLIPSIS, mono), "…");
    }

    #[test]
    fn clipping_is_idempotent_and_within_budget() {
        let text = "The quick brown fox jumps over the lazy dog";
        for mode in [
            ClipMode::Truncate,
            ClipMode::EllipsisStart,
            ClipMode::EllipsisMiddle,
            ClipMode::EllipsisEnd,
        ] {
            for budget in [10, 35, 80, 200, 1000] {
                let once = clip_text(text, mode, budget, 0, ELLIPSIS, mono);
                let twice = clip_text(&once, mode, budget, 0, ELLIPSIS, mono);
                assert_eq!(once, twice, "mode {mode} budget {budget}");
                assert!(mono(&once) <= budget.max(mono(ELLIPSIS)), "mode {mode}");
                assert!(mono(&once) <= mono(text));
            }
        }
    }

    #[test]
    fn clip_mode_parses_round_trip() {
        for mode in [
            ClipMode::Truncate,
            ClipMode::EllipsisStart,
            ClipMode::EllipsisMiddle,
            ClipMode::EllipsisEnd,
        ] {
            assert_eq!(mode.as_str().parse::<ClipMode>(), Ok(mode));
        }
        assert!("wrap".parse::<ClipMode>().is_err());
    }
}
