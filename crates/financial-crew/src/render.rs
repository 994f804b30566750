//! HTML page: the input form plus the outcome of the last run

use crate::error::Result;
use crate::request::{AnalysisRequest, RiskTolerance, TradingStrategy};
use minijinja::{Environment, context};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

/// What the page shows below the title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState<'a> {
    /// Form only
    Fresh,
    /// The result text of this run
    Results(&'a str),
    /// A generic failure notice, never a previous result
    Failed,
}

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Financial Analysis Crew</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 0; display: flex; color: #1d1d1f; }
    aside { width: 18rem; min-height: 100vh; padding: 1.5rem; background: #f0f2f6; }
    main { flex: 1; padding: 2rem; }
    label { display: block; margin-top: 0.9rem; font-weight: 600; }
    input[type=text], input[type=number], select { width: 100%; padding: 0.45rem; box-sizing: border-box; }
    .checkbox label { display: inline; font-weight: 400; }
    button { margin-top: 1.2rem; padding: 0.6rem 1rem; }
    #spinner { display: none; color: #555; }
    .result { background: #f6f8fa; padding: 0.25rem 1rem; line-height: 1.5; }
    .result table { border-collapse: collapse; }
    .result th, .result td { border: 1px solid #d0d7de; padding: 0.3rem 0.6rem; }
    .error { background: #fdecea; color: #611a15; padding: 1rem; border-radius: 6px; }
  </style>
</head>
<body>
  <aside>
    <h2>Input Parameters</h2>
    <form method="post" action="/analyze" onsubmit="document.getElementById('spinner').style.display='block'">
      <label for="stock_selection">Stock Symbol</label>
      <input type="text" id="stock_selection" name="stock_selection" value="{{ request.stock_selection }}" />

      <label for="initial_capital">Initial Capital</label>
      <input type="number" id="initial_capital" name="initial_capital" step="1000" value="{{ request.initial_capital }}" />

      <label for="risk_tolerance">Risk Tolerance</label>
      <select id="risk_tolerance" name="risk_tolerance">
        {%- for option in risk_options %}
        <option{% if option == request.risk_tolerance %} selected{% endif %}>{{ option }}</option>
        {%- endfor %}
      </select>

      <label for="trading_strategy_preference">Trading Strategy</label>
      <select id="trading_strategy_preference" name="trading_strategy_preference">
        {%- for option in strategy_options %}
        <option{% if option == request.trading_strategy_preference %} selected{% endif %}>{{ option }}</option>
        {%- endfor %}
      </select>

      <p class="checkbox">
        <input type="checkbox" id="news_impact_consideration" name="news_impact_consideration"{% if request.news_impact_consideration %} checked{% endif %} />
        <label for="news_impact_consideration">Consider News Impact</label>
      </p>

      <button type="submit">Run Analysis</button>
    </form>
  </aside>
  <main>
    <h1>Financial Analysis Crew</h1>
    <p id="spinner">Analyzing... This may take a few minutes...</p>
    {%- if state == "results" %}
    <h2>Analysis Results</h2>
    <div class="result">{{ result|safe }}</div>
    {%- elif state == "failed" %}
    <div class="error">The analysis could not be completed. Check the server logs and try again.</div>
    {%- endif %}
  </main>
</body>
</html>
"#;

/// Convert the Markdown result text to HTML
///
/// Raw HTML in the text is shown as text and `javascript:` link targets are
/// dropped, so the result cannot add markup of its own.
pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_script_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if is_script_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn is_script_url(url: &str) -> bool {
    let scheme = url
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(11)
        .collect::<String>()
        .to_ascii_lowercase();
    ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|prefix| scheme.starts_with(prefix))
}

/// Render the full page
///
/// Form values are HTML-escaped; the result is rendered from Markdown.
pub fn render(request: &AnalysisRequest, state: PageState<'_>) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("page.html", PAGE_TEMPLATE)?;

    let (state_name, result) = match state {
        PageState::Fresh => ("fresh", None),
        PageState::Results(text) => ("results", Some(markdown_to_html(text))),
        PageState::Failed => ("failed", None),
    };

    let html = env.get_template("page.html")?.render(context! {
        request => request,
        risk_options => RiskTolerance::ALL.map(RiskTolerance::as_str),
        strategy_options => TradingStrategy::ALL.map(TradingStrategy::as_str),
        state => state_name,
        result => result,
    })?;
    Ok(html)
}
