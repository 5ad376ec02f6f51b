use rand::Rng;

/// Digits in a national number, area code included.
const NATIONAL_DIGITS: usize = 10;

/// Builds a phone number from a dialing template.
///
/// A run of `A`s in the template is the area-code slot and each `X` is an
/// independent random digit. The template is cut after the `X` that brings
/// the number to ten digits, so long templates never overshoot. Without an
/// area code a random one in `100..=999` is used.
pub fn synthesize<R: Rng + ?Sized>(
    area_code: Option<&str>,
    calling_code: &str,
    template: &str,
    rng: &mut R,
) -> String {
    let area_code = match area_code.filter(|code| !code.is_empty()) {
        Some(code) => code.to_string(),
        None => rng.random_range(100..=999).to_string(),
    };
    let template = truncate_template(template, area_code.chars().count());

    let mut number = String::with_capacity(calling_code.len() + template.len() + area_code.len());
    number.push_str(calling_code);

    let mut in_area_slot = false;
    for ch in template.chars() {
        match ch {
            'A' if in_area_slot => {}
            'A' => number.push_str(&area_code),
            'X' => number.push(char::from(b'0' + rng.random_range(0..=9_u8))),
            other => number.push(other),
        }
        in_area_slot = ch == 'A';
    }
    number
}

/// Shortest template prefix whose digit slots complete a ten-digit number.
fn truncate_template(template: &str, area_len: usize) -> &str {
    let mut remaining = NATIONAL_DIGITS as isize - area_len as isize;
    for (index, ch) in template.char_indices() {
        if ch == 'X' {
            remaining -= 1;
            if remaining <= 0 {
                return &template[..index + ch.len_utf8()];
            }
        }
    }
    template
}
