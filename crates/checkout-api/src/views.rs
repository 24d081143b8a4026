//! # HTML Views
//!
//! Server-rendered pages: the package catalog and the post-checkout
//! confirmation pages. All catalog text is escaped before rendering.

use checkout_core::{Catalog, Package};

const STYLE: &str = r#"
    body { font-family: system-ui; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%); color: #222; min-height: 100vh; }
    header { color: white; text-align: center; padding: 48px 16px 24px; }
    .packages { display: flex; flex-wrap: wrap; gap: 24px; justify-content: center; padding: 0 16px 48px; }
    .package { background: white; border-radius: 16px; padding: 32px; width: 280px; }
    .price { font-size: 32px; font-weight: bold; }
    .duration { color: #666; }
    button { width: 100%; padding: 12px; border: 0; border-radius: 8px; background: #635bff; color: white; font-size: 16px; cursor: pointer; }
    .notice { display: flex; justify-content: center; align-items: center; height: 100vh; }
    .notice div { background: white; padding: 60px; border-radius: 16px; text-align: center; }
"#;

const CHECKOUT_SCRIPT: &str = r#"
document.querySelectorAll('button[data-package]').forEach(function (button) {
  button.addEventListener('click', async function () {
    button.disabled = true;
    try {
      const res = await fetch('/create-checkout-session', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ packageType: button.dataset.package })
      });
      const data = await res.json();
      if (data.url) {
        window.location.href = data.url;
        return;
      }
      alert(data.error || 'Payment session creation failed');
    } catch (e) {
      alert('Payment session creation failed');
    }
    button.disabled = false;
  });
});
"#;

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn package_card(catalog: &Catalog, package: &Package) -> String {
    let duration = package
        .duration
        .as_deref()
        .map(|d| format!(r#"<p class="duration">{}</p>"#, escape_html(d)))
        .unwrap_or_default();

    let features: String = package
        .features
        .iter()
        .map(|f| format!("<li>{}</li>", escape_html(f)))
        .collect();

    format!(
        r#"<section class="package"><h2>{name}</h2>{duration}<p class="price">{price} {currency}</p><p>{description}</p><ul>{features}</ul><button data-package="{id}">Book {name}</button></section>"#,
        name = escape_html(&package.name),
        duration = duration,
        price = package.price,
        currency = catalog.currency(),
        description = escape_html(&package.description),
        features = features,
        id = escape_html(&package.id),
    )
}

/// Catalog page with the publishable key embedded for the payment widget
pub fn index_page(catalog: &Catalog, publishable_key: &str) -> String {
    let title = catalog.brand().unwrap_or("Packages");

    let cards: String = catalog
        .packages()
        .iter()
        .map(|package| package_card(catalog, package))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="stripe-publishable-key" content="{key}">
<title>{title}</title>
<style>{style}</style>
</head>
<body data-publishable-key="{key}">
<header><h1>{title}</h1></header>
<main class="packages">{cards}</main>
<script>{script}</script>
</body>
</html>
"#,
        key = escape_html(publishable_key),
        title = escape_html(title),
        style = STYLE,
        cards = cards,
        script = CHECKOUT_SCRIPT,
    )
}

/// Checkout success page
pub fn success_page(session_id: Option<&str>) -> String {
    let session = session_id
        .map(|id| format!("<p>Session: <code>{}</code></p>", escape_html(id)))
        .unwrap_or_default();

    notice_page(
        "Payment Successful",
        "✅",
        &format!(
            r#"<h1>Payment Successful!</h1>{}<p style="color: #666;">Your payment was processed successfully.</p>"#,
            session
        ),
    )
}

/// Checkout cancel page
pub fn cancel_page() -> String {
    notice_page(
        "Payment Cancelled",
        "❌",
        r#"<h1>Payment Cancelled</h1><p style="color: #666;">No charges were made.</p><p><a href="/">Back to packages</a></p>"#,
    )
}

fn notice_page(title: &str, icon: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title><style>{style}</style></head>
<body>
<div class="notice"><div><div style="font-size: 60px;">{icon}</div>{body}</div></div>
</body>
</html>
"#,
        title = title,
        style = STYLE,
        icon = icon,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("Vägassistans 24/7"), "Vägassistans 24/7");
    }

    #[test]
    fn test_index_lists_every_package() {
        let catalog = Catalog::builtin().unwrap();
        let html = index_page(&catalog, "pk_test_xyz789");

        assert!(html.contains(r#"content="pk_test_xyz789""#));
        assert!(html.contains("<title>DriveX</title>"));
        for package in catalog.packages() {
            assert!(html.contains(&format!(r#"data-package="{}""#, package.id)));
            assert!(html.contains(&package.name));
        }
        assert!(html.contains("1990 SEK"));
        assert!(html.contains("<li>Personlig concierge</li>"));
    }

    #[test]
    fn test_success_page_escapes_session() {
        let html = success_page(Some("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<code><script>"));

        assert!(!success_page(None).contains("Session:"));
    }

    #[test]
    fn test_cancel_page() {
        assert!(cancel_page().contains("Payment Cancelled"));
    }
}
