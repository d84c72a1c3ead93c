/// Split points in priority order: sentence terminators, clause punctuation,
/// whitespace, then the enumeration comma.
pub const BOUNDARY_CHARS: &[char] = &[
    '。', '！', '？', '.', '!', '?', // sentence
    '，', '；', '：', ',', ';', ':', // clause
    ' ', '\t', '\n', '\u{3000}', // whitespace
    '、',
];

/// Characters searched on each side of the target offset.
pub const SNAP_WINDOW: usize = 5;

#[inline]
pub fn is_boundary(ch: char) -> bool {
    BOUNDARY_CHARS.contains(&ch)
}

/// Moves `target` (a char offset into `text`) to just after a nearby boundary
/// character, never below `min`. Forward positions win over backward ones.
pub fn snap_boundary(text: &str, target: usize, min: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    snap_chars(&chars, target, min)
}

pub(crate) fn snap_chars(chars: &[char], target: usize, min: usize) -> usize {
    let len = chars.len();
    if target >= len {
        return len;
    }
    if target <= min {
        return min;
    }

    for k in 0..=SNAP_WINDOW {
        let pos = target + k;
        if pos >= len {
            break;
        }
        if is_boundary(chars[pos]) {
            return pos + 1;
        }
    }

    for k in 1..=SNAP_WINDOW {
        let Some(pos) = target.checked_sub(k) else {
            break;
        };
        if pos <= min {
            break;
        }
        if is_boundary(chars[pos]) {
            return pos + 1;
        }
    }

    target
}
