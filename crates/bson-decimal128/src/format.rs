//! `Decimal128` to text.

use std::fmt;

use crate::decimal128::Decimal128;

impl fmt::Display for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.is_negative();
        if self.is_nan() {
            return f.write_str(if negative { "-NaN" } else { "NaN" });
        }
        if self.is_infinite() {
            return f.write_str(if negative { "-Infinity" } else { "Infinity" });
        }

        let exponent = self.exponent();
        let digits = self.coefficient().to_string();
        let adjusted_exponent = exponent as i64 + digits.len() as i64 - 1;

        let mut out = String::with_capacity(digits.len() + 10);
        if negative {
            out.push('-');
        }
        if exponent > 0 || adjusted_exponent < -6 {
            out.push_str(&digits[..1]);
            if digits.len() > 1 {
                out.push('.');
                out.push_str(&digits[1..]);
            }
            out.push('E');
            if adjusted_exponent >= 0 {
                out.push('+');
            }
            out.push_str(&adjusted_exponent.to_string());
        } else if exponent == 0 {
            out.push_str(&digits);
        } else {
            let scale = exponent.unsigned_abs() as usize;
            if digits.len() > scale {
                let point = digits.len() - scale;
                out.push_str(&digits[..point]);
                out.push('.');
                out.push_str(&digits[point..]);
            } else {
                out.push_str("0.");
                out.extend(std::iter::repeat('0').take(scale - digits.len()));
                out.push_str(&digits);
            }
        }
        f.write_str(&out)
    }
}
