/// HTML templates for the dashboard
///
/// Every function returns a String for an Axum `Html` response. Full pages
/// go through `base_template`; everything else is an htmx partial. Dynamic
/// text is always passed through `html_escape`.
use crate::notifications::Notification;
use crate::pricing::{CoinEntry, Freshness};
use crate::webserver::utils::html_escape;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";
const PICO_CSS: &str = "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css";

/// Values shown in the page chrome
pub struct PageContext<'a> {
    pub notification_count: usize,
    pub avg_refresh_ms: u64,
    pub version: &'a str,
    pub commit: &'a str,
    pub show_logout: bool,
}

/// Base HTML template with header, footer and the row-refresh script
pub fn base_template(title: &str, ctx: &PageContext<'_>, content: &str) -> String {
    let logout = if ctx.show_logout {
        r#"<li><a href="/logout" class="secondary">Logout</a></li>"#
    } else {
        ""
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - CoinOps</title>
    <link rel="stylesheet" href="{pico}">
    <script src="{htmx}"></script>
    <style>
        {styles}
    </style>
</head>
<body data-avg-refresh-ms="{avg}" data-version="{version}">
    <header class="container">
        <nav>
            <ul><li><strong>CoinOps Dashboard</strong></li></ul>
            <ul>
                <li>
                    <a href="/notifications" hx-get="/notifications" hx-target="#notifications" hx-swap="innerHTML">
                        Notifications <span id="notification-count" class="badge">{count}</span>
                    </a>
                </li>
                {logout}
            </ul>
        </nav>
    </header>

    <main class="container">
        {content}
    </main>

    <footer class="container">
        <small>CoinOps v{version} ({commit})</small>
    </footer>

    <script>
        {scripts}
    </script>
</body>
</html>"##,
        title = html_escape(title),
        pico = PICO_CSS,
        htmx = HTMX_SRC,
        styles = common_styles(),
        avg = ctx.avg_refresh_ms,
        version = html_escape(ctx.version),
        commit = html_escape(ctx.commit),
        count = ctx.notification_count,
        logout = logout,
        content = content,
        scripts = common_scripts(),
    )
}

fn common_styles() -> &'static str {
    r#"
        .badge { padding: 0 .4em; border-radius: 1em; background: var(--pico-primary); color: #fff; }
        .change-up { color: #2e7d32; }
        .change-down { color: #c62828; }
        .freshness { display: block; margin-bottom: .5rem; color: #b26a00; }
        .countdown { font-variant-numeric: tabular-nums; opacity: .6; }
        .htmx-request .spinner { display: inline; }
        .spinner { display: none; }
    "#
}

/// Each ticker row carries its own queue of delays in `data-delays`; the
/// first entry schedules the next self-refresh of that row.
fn common_scripts() -> &'static str {
    r#"
        function scheduleRow(row) {
            if (row.dataset.scheduled) return;
            row.dataset.scheduled = "1";
            var delays = [];
            try { delays = JSON.parse(row.dataset.delays || "[]"); } catch (e) {}
            var delay = delays.length ? delays[0] : parseInt(document.body.dataset.avgRefreshMs, 10);
            var countdown = row.querySelector(".countdown");
            var due = Date.now() + delay;
            var tick = setInterval(function () {
                if (!document.body.contains(row)) { clearInterval(tick); return; }
                var left = Math.max(0, due - Date.now());
                if (countdown) countdown.textContent = (left / 1000).toFixed(1) + "s";
                if (left === 0) { clearInterval(tick); htmx.trigger(row, "refresh"); }
            }, 100);
        }
        document.addEventListener("htmx:load", function (evt) {
            evt.detail.elt.querySelectorAll && evt.detail.elt.querySelectorAll(".ticker-row").forEach(scheduleRow);
            if (evt.detail.elt.classList && evt.detail.elt.classList.contains("ticker-row")) scheduleRow(evt.detail.elt);
        });
    "#
}

/// Dashboard body; the table itself is loaded by htmx
pub fn dashboard_content() -> String {
    r##"<section>
        <input type="search" name="search" placeholder="Search coins..."
               hx-get="/search" hx-trigger="input changed delay:300ms, search"
               hx-target="#ticker" hx-swap="innerHTML">
        <div id="ticker" hx-get="/ticker" hx-trigger="load" hx-swap="innerHTML">
            <p aria-busy="true">Loading prices...</p>
        </div>
    </section>

    <section>
        <button hx-post="/generate-report" hx-target="#report-status" hx-swap="innerHTML">
            Generate compliance report <span class="spinner" aria-busy="true"></span>
        </button>
        <div id="report-status"></div>
    </section>

    <section id="notifications"></section>"##
        .to_string()
}

pub fn format_price(price: f64) -> String {
    if price >= 1.0 {
        format!("${:.2}", price)
    } else {
        format!("${:.6}", price)
    }
}

pub fn format_change(change: f64) -> String {
    format!("{:+.2}%", change)
}

pub fn ticker_row(coin: &CoinEntry, delays: &[u64]) -> String {
    let id = html_escape(&coin.id);
    let delays_json = serde_json::to_string(delays).unwrap_or_else(|_| "[]".to_string());
    let change_class = if coin.change_24h_pct >= 0.0 {
        "change-up"
    } else {
        "change-down"
    };

    format!(
        r#"<tr id="coin-{id}" class="ticker-row" hx-get="/ticker/{id}" hx-trigger="refresh" hx-swap="outerHTML" data-delays="{delays}">
    <td>{name}</td>
    <td class="price">{price}</td>
    <td class="{change_class}">{change}</td>
    <td class="countdown"></td>
</tr>"#,
        id = id,
        delays = html_escape(&delays_json),
        name = html_escape(&coin.display_name),
        price = format_price(coin.price_usd),
        change_class = change_class,
        change = format_change(coin.change_24h_pct),
    )
}

/// Rows are `(entry, delay queue)` pairs in display order
pub fn ticker_table(rows: &[(CoinEntry, Vec<u64>)], freshness: Freshness) -> String {
    let notice = match freshness {
        Freshness::Stale => {
            r#"<small class="freshness" data-freshness="stale">Live prices unavailable, showing last known values.</small>"#
        }
        Freshness::Fallback => {
            r#"<small class="freshness" data-freshness="fallback">Live prices unavailable, showing reference values.</small>"#
        }
        Freshness::Live | Freshness::Cached => "",
    };

    let body = if rows.is_empty() {
        r#"<tr><td colspan="4">No coins found</td></tr>"#.to_string()
    } else {
        rows.iter()
            .map(|(coin, delays)| ticker_row(coin, delays))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"{notice}<table class="striped">
<thead><tr><th>Coin</th><th>Price (USD)</th><th>24h</th><th>Next refresh</th></tr></thead>
<tbody>
{body}
</tbody>
</table>"#,
        notice = notice,
        body = body,
    )
}

/// Response of POST /generate-report; also bumps the header badge
pub fn report_success(timestamp: &str, notification_count: usize) -> String {
    format!(
        r#"<article class="report-success">
    <p>Report <strong>{timestamp}</strong> generated successfully.</p>
</article>
<span id="notification-count" class="badge" hx-swap-oob="true">{count}</span>"#,
        timestamp = html_escape(timestamp),
        count = notification_count,
    )
}

pub fn notifications_list(notifications: &[Notification]) -> String {
    if notifications.is_empty() {
        return r#"<article><p>No notifications</p></article>"#.to_string();
    }

    let items: Vec<String> = notifications
        .iter()
        .map(|n| {
            format!(
                r#"<li data-id="{id}"><strong>{title}</strong> {message} <small>{time}</small></li>"#,
                id = n.id,
                title = html_escape(&n.title),
                message = html_escape(&n.message),
                time = n.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            )
        })
        .collect();

    format!(
        r#"<article>
    <header>Notifications ({count})</header>
    <ul>
        {items}
    </ul>
</article>"#,
        count = notifications.len(),
        items = items.join("\n        "),
    )
}

/// Login page; the form posts to /auth and follows the JSON `redirect`
pub fn login_page(redirect: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Login - CoinOps</title>
    <link rel="stylesheet" href="{pico}">
</head>
<body>
    <main class="container">
        <article>
            <h1>CoinOps Login</h1>
            <form id="login-form" method="post" action="/auth?redirect={redirect}">
                <input type="text" name="username" placeholder="Username" autocomplete="username" required>
                <input type="password" name="password" placeholder="Password" autocomplete="current-password" required>
                <button type="submit">Sign in</button>
                <small id="login-error" role="alert"></small>
            </form>
        </article>
    </main>
    <script>
        document.getElementById("login-form").addEventListener("submit", function (e) {{
            e.preventDefault();
            var form = e.target;
            fetch(form.action, {{ method: "POST", body: new URLSearchParams(new FormData(form)) }})
                .then(function (r) {{ return r.json(); }})
                .then(function (data) {{
                    if (data.success) {{ window.location = data.redirect || "/"; }}
                    else {{ document.getElementById("login-error").textContent = data.error || "Login failed"; }}
                }});
        }});
    </script>
</body>
</html>"#,
        pico = PICO_CSS,
        redirect = html_escape(redirect),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn coin(id: &str, name: &str, price: f64, change: f64) -> CoinEntry {
        CoinEntry {
            id: id.to_string(),
            display_name: name.to_string(),
            price_usd: price,
            change_24h_pct: change,
        }
    }

    #[test]
    fn test_ticker_row_embeds_delays() {
        let html = ticker_row(&coin("bitcoin", "Bitcoin", 50000.0, 2.5), &[1200, 800, 4300]);

        assert!(html.contains(r#"id="coin-bitcoin""#));
        assert!(html.contains(r#"hx-get="/ticker/bitcoin""#));
        assert!(html.contains(r#"data-delays="[1200,800,4300]""#));
        assert!(html.contains("$50000.00"));
        assert!(html.contains("+2.50%"));
        assert!(html.contains("change-up"));
    }

    #[test]
    fn test_display_name_is_escaped() {
        let html = ticker_row(&coin("x", "<b>Evil</b>", 1.0, -1.0), &[]);
        assert!(html.contains("&lt;b&gt;Evil&lt;/b&gt;"));
        assert!(!html.contains("<b>Evil"));
        assert!(html.contains("change-down"));
    }

    #[test]
    fn test_small_prices_keep_precision() {
        assert_eq!(format_price(0.082), "$0.082000");
        assert_eq!(format_change(-1.234), "-1.23%");
    }

    #[test]
    fn test_table_freshness_notice() {
        let rows = vec![(coin("bitcoin", "Bitcoin", 1.0, 0.0), vec![10])];
        assert!(!ticker_table(&rows, Freshness::Live).contains("freshness"));
        assert!(ticker_table(&rows, Freshness::Stale).contains(r#"data-freshness="stale""#));
        assert!(ticker_table(&[], Freshness::Fallback).contains("No coins found"));
    }

    #[test]
    fn test_notifications_list() {
        assert!(notifications_list(&[]).contains("No notifications"));

        let html = notifications_list(&[Notification {
            id: 2,
            title: "Report Ready".to_string(),
            message: "Compliance report <x> generated".to_string(),
            timestamp: Utc::now(),
        }]);
        assert!(html.contains(r#"data-id="2""#));
        assert!(html.contains("Compliance report &lt;x&gt; generated"));
    }

    #[test]
    fn test_base_template() {
        let ctx = PageContext {
            notification_count: 3,
            avg_refresh_ms: 5000,
            version: "0.1.0",
            commit: "abc",
            show_logout: true,
        };
        let html = base_template("Dashboard", &ctx, &dashboard_content());

        assert!(html.contains("<title>Dashboard - CoinOps</title>"));
        assert!(html.contains(r#"data-avg-refresh-ms="5000""#));
        assert!(html.contains(r#"hx-get="/ticker""#));
        assert!(html.contains("/logout"));
    }
}
