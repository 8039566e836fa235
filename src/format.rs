// 💰 Currency Formatters - Brazilian R$ strings, bit-exact for tests
// Thousands '.', decimal ','; compact K/M form for the headline metrics

/// Fixed 2-decimal localized currency string: `R$ 1.234,56`.
/// NaN formats as the zero-currency string.
pub fn formatar_moeda(valor: f64) -> String {
    if valor.is_nan() {
        return "R$ 0,00".to_string();
    }

    let texto = format!("{:.2}", valor);
    let (sinal, resto) = match texto.strip_prefix('-') {
        Some(resto) => ("-", resto),
        None => ("", texto.as_str()),
    };
    let (inteiro, decimal) = resto.split_once('.').unwrap_or((resto, "00"));

    format!("R$ {}{},{}", sinal, group_thousands(inteiro), decimal)
}

/// Compact currency string for tight spaces: `R$ 2,5M`, `R$ 2K`, `R$ 750`.
///
/// One decimal place (comma) for millions; whole numbers elsewhere. The
/// thousands form *rounds* (`1500 -> "R$ 2K"`) - kept exactly as the
/// dashboard has always displayed it. Zero and NaN both format as `R$ 0`.
pub fn formatar_moeda_compacto(valor: f64) -> String {
    if valor.is_nan() || valor == 0.0 {
        return "R$ 0".to_string();
    }

    if valor.abs() >= 1_000_000.0 {
        let milhoes = format!("{:.1}", valor / 1_000_000.0).replace('.', ",");
        return format!("R$ {}M", milhoes);
    }

    if valor.abs() >= 1_000.0 {
        return format!("R$ {:.0}K", valor / 1_000.0);
    }

    format!("R$ {:.0}", valor)
}

/// Insert '.' every three digits, right to left.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    out
}

// ============================================================================
// TESTS
// ============================================================================
