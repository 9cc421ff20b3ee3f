use std::fmt;

/// Exact fraction value used for question answers and answer checking.
/// Always stored in lowest terms with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    numer: i64,
    denom: i64,
}

fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl Rational {
    /// None for a zero denominator, or when the reduced magnitude does
    /// not fit in i64 (only reachable through `parse` on extreme input).
    pub fn new(numer: i64, denom: i64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let g = gcd(numer.unsigned_abs(), denom.unsigned_abs());
        let numer_mag = numer.unsigned_abs() / g;
        let denom_mag = denom.unsigned_abs() / g;
        let negative = (numer < 0) != (denom < 0) && numer_mag != 0;
        let numer = i64::try_from(numer_mag).ok()?;
        let denom = i64::try_from(denom_mag).ok()?;
        Some(Self {
            numer: if negative { -numer } else { numer },
            denom,
        })
    }

    pub fn from_integer(n: i64) -> Self {
        Self { numer: n, denom: 1 }
    }

    pub fn numer(&self) -> i64 {
        self.numer
    }

    pub fn denom(&self) -> i64 {
        self.denom
    }

    pub fn is_integer(&self) -> bool {
        self.denom == 1
    }

    pub fn add(&self, other: &Self) -> Self {
        // Operand magnitudes are tiny (question generation), no overflow risk
        Self::new(
            self.numer * other.denom + other.numer * self.denom,
            self.denom * other.denom,
        )
        .unwrap_or(Self { numer: 0, denom: 1 })
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::new(
            self.numer * other.denom - other.numer * self.denom,
            self.denom * other.denom,
        )
        .unwrap_or(Self { numer: 0, denom: 1 })
    }

    pub fn to_f64(&self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    /// Parse an integer (`"7"`), a fraction (`"3/4"`), or a decimal
    /// (`"0.75"`). Returns None for anything else; user text is never an
    /// error condition.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Some((n, d)) = s.split_once('/') {
            let numer = n.trim().parse::<i64>().ok()?;
            let denom = d.trim().parse::<i64>().ok()?;
            return Self::new(numer, denom);
        }
        if let Some((int_part, frac_part)) = s.split_once('.') {
            if frac_part.len() > 9 || frac_part.chars().any(|c| !c.is_ascii_digit()) {
                return None;
            }
            let negative = int_part.starts_with('-');
            let whole = if int_part == "-" || int_part.is_empty() {
                0
            } else {
                int_part.parse::<i64>().ok()?.checked_abs()?
            };
            let frac = if frac_part.is_empty() {
                0
            } else {
                frac_part.parse::<i64>().ok()?
            };
            let scale = 10i64.pow(frac_part.len() as u32);
            let magnitude = whole.checked_mul(scale)?.checked_add(frac)?;
            let numer = if negative { -magnitude } else { magnitude };
            return Self::new(numer, scale);
        }
        s.parse::<i64>().ok().map(Self::from_integer)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Cross-multiplied in i128; parsed values can sit near i64::MAX
        let lhs = self.numer as i128 * other.denom as i128;
        let rhs = other.numer as i128 * self.denom as i128;
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reduces_to_lowest_terms() {
        let r = Rational::new(2, 4).unwrap();
        assert_eq!(r.numer(), 1);
        assert_eq!(r.denom(), 2);
    }

    #[test]
    fn test_new_normalizes_sign() {
        let r = Rational::new(1, -2).unwrap();
        assert_eq!(r.numer(), -1);
        assert_eq!(r.denom(), 2);
    }

    #[test]
    fn test_new_zero_denominator() {
        assert_eq!(Rational::new(1, 0), None);
    }

    #[test]
    fn test_whole_number_display() {
        assert_eq!(Rational::new(4, 2).unwrap().to_string(), "2");
        assert_eq!(Rational::new(3, 4).unwrap().to_string(), "3/4");
        assert_eq!(Rational::new(0, 5).unwrap().to_string(), "0");
    }

    #[test]
    fn test_add_and_sub() {
        let a = Rational::new(1, 2).unwrap();
        let b = Rational::new(1, 3).unwrap();
        assert_eq!(a.add(&b), Rational::new(5, 6).unwrap());
        assert_eq!(a.sub(&b), Rational::new(1, 6).unwrap());
    }

    #[test]
    fn test_add_reduces() {
        let a = Rational::new(1, 4).unwrap();
        let b = Rational::new(1, 4).unwrap();
        assert_eq!(a.add(&b), Rational::new(1, 2).unwrap());
    }

    #[test]
    fn test_ordering() {
        let half = Rational::new(1, 2).unwrap();
        let third = Rational::new(1, 3).unwrap();
        assert!(third < half);
        assert!(half <= Rational::new(2, 4).unwrap());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(Rational::parse("7"), Some(Rational::from_integer(7)));
        assert_eq!(Rational::parse(" -3 "), Some(Rational::from_integer(-3)));
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(Rational::parse("2/4"), Rational::new(1, 2));
        assert_eq!(Rational::parse("3/1"), Some(Rational::from_integer(3)));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Rational::parse("0.5"), Rational::new(1, 2));
        assert_eq!(Rational::parse(".25"), Rational::new(1, 4));
        assert_eq!(Rational::parse("1."), Some(Rational::from_integer(1)));
        assert_eq!(Rational::parse("-0.5"), Rational::new(-1, 2));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(Rational::parse(""), None);
        assert_eq!(Rational::parse("abc"), None);
        assert_eq!(Rational::parse("1/0"), None);
        assert_eq!(Rational::parse("1//2"), None);
        assert_eq!(Rational::parse("1.2.3"), None);
        assert_eq!(Rational::parse("/"), None);
    }

    #[test]
    fn test_parse_extreme_magnitudes() {
        // Decimal expansion past i64 range is None, never a panic
        assert_eq!(Rational::parse("99999999999.999999999"), None);
        assert_eq!(Rational::parse("9223372036854775807.9"), None);
        assert_eq!(Rational::parse("-99999999999.999999999"), None);

        // i64::MIN operands reduce (or reject) without overflowing
        assert_eq!(
            Rational::parse("-9223372036854775808/2"),
            Some(Rational::from_integer(-4_611_686_018_427_387_904))
        );
        assert_eq!(
            Rational::parse("-9223372036854775808/-9223372036854775808"),
            Some(Rational::from_integer(1))
        );
        assert_eq!(Rational::new(i64::MIN, -1), None);
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(Rational::new(1, 2).unwrap().to_f64(), 0.5);
        assert_eq!(Rational::new(-3, 4).unwrap().to_f64(), -0.75);
    }
}
