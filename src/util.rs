//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// True if `s` is a valid HTML floating-point number:
/// `-`? (digits | digits "." digits | "." digits) ([eE] [+-]? digits)?
pub fn is_valid_float_literal(s: &str) -> bool {
  let b = s.as_bytes();
  let mut i = 0;
  if b.first() == Some(&b'-') { i += 1; }

  let int_start = i;
  while i < b.len() && b[i].is_ascii_digit() { i += 1; }
  let has_int = i > int_start;

  let mut has_frac = false;
  if i < b.len() && b[i] == b'.' {
    i += 1;
    let frac_start = i;
    while i < b.len() && b[i].is_ascii_digit() { i += 1; }
    if i == frac_start { return false; }
    has_frac = true;
  }
  if !has_int && !has_frac { return false; }

  if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
    i += 1;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') { i += 1; }
    let exp_start = i;
    while i < b.len() && b[i].is_ascii_digit() { i += 1; }
    if i == exp_start { return false; }
  }
  i == b.len()
}

/// Value sanitization of `<input type=number>`: invalid literals become empty.
pub fn sanitize_number(raw: &str) -> String {
  if is_valid_float_literal(raw) { raw.to_string() } else { String::new() }
}

/// Parse a sanitized field value as a strictly positive, finite number.
pub fn parse_positive(raw: &str) -> Option<f64> {
  raw.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// One-decimal display matching the browser's `toFixed(1)`: the exact value is rounded to the
/// nearest tenth and exact ties go away from zero (`{:.1}` alone picks the even tenth).
pub fn format_one_decimal(x: f64) -> String {
  // a double sits exactly between two tenths only when it is an odd number of quarters
  if x.is_finite() && (x * 4.0).fract() == 0.0 && (x * 2.0).fract() != 0.0 {
    let away = (x.abs() * 10.0 + 0.5).floor() / 10.0;
    return format!("{:.1}", away.copysign(x));
  }
  format!("{:.1}", x)
}

/// Log-safe truncation for user-typed strings.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) { cut -= 1; }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}
