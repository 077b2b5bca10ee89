/// Redis `KEYS` pattern matching over bytes.
///
/// `*` matches any run, `?` any single byte, `[...]` a class (with `^` for
/// negation and `a-z` ranges), and `\` escapes the next byte.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    matches(pattern.as_bytes(), key.as_bytes())
}

fn matches(pattern: &[u8], key: &[u8]) -> bool {
    let (mut p, mut k) = (0, 0);
    // Where to resume after the most recent `*`: (pattern pos, key pos).
    let mut resume: Option<(usize, usize)> = None;

    while k < key.len() {
        let step = match pattern.get(p) {
            Some(b'*') => {
                resume = Some((p + 1, k));
                p += 1;
                continue;
            }
            Some(b'?') => Some(1),
            Some(b'[') => class(&pattern[p..], key[k]),
            Some(b'\\') if p + 1 < pattern.len() => (pattern[p + 1] == key[k]).then_some(2),
            Some(&c) => (c == key[k]).then_some(1),
            None => None,
        };

        match (step, resume) {
            (Some(width), _) => {
                p += width;
                k += 1;
            }
            (None, Some((star_p, star_k))) => {
                p = star_p;
                k = star_k + 1;
                resume = Some((star_p, star_k + 1));
            }
            (None, None) => return false,
        }
    }

    pattern[p.min(pattern.len())..].iter().all(|&c| c == b'*')
}

/// Match `byte` against the class at the start of `pattern`. Returns the
/// class width on a match.
fn class(pattern: &[u8], byte: u8) -> Option<usize> {
    let close = pattern.iter().skip(1).position(|&c| c == b']')? + 1;
    let mut body = &pattern[1..close];
    let negate = body.first() == Some(&b'^');
    if negate {
        body = &body[1..];
    }

    let mut hit = false;
    let mut i = 0;
    while i < body.len() {
        if i + 2 < body.len() && body[i + 1] == b'-' {
            let (lo, hi) = (body[i].min(body[i + 2]), body[i].max(body[i + 2]));
            hit |= (lo..=hi).contains(&byte);
            i += 3;
        } else {
            hit |= body[i] == byte;
            i += 1;
        }
    }

    (hit != negate).then_some(close + 1)
}
