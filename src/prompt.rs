use crate::location::LocationInfo;

/// Build the system prompt for the disruption-reporting agent using today's
/// date. Pure string templating; no validation happens here.
pub fn build_disruption_prompt(location: &LocationInfo, session_id: Option<&str>) -> String {
    let current_date = chrono::Local::now().format("%B %-d, %Y").to_string();
    render_prompt(location, session_id, &current_date)
}

/// Deterministic core of the prompt builder. The session identifier is
/// accepted for parity with the service call chain but does not influence
/// the template.
pub fn render_prompt(
    location: &LocationInfo,
    _session_id: Option<&str>,
    current_date: &str,
) -> String {
    let country_line = if location.country.is_empty() {
        "Infer the user's country from context.".to_string()
    } else {
        format!(
            "The user is asking about a location in {}.",
            location.country
        )
    };

    let language_hint = if location.language.is_empty() {
        String::new()
    } else {
        format!(" ({})", location.language)
    };

    let language_param = if location.iso_code.is_empty() {
        "two-letter ISO language code of that country (e.g., \"fr\")".to_string()
    } else if location.language.is_empty() {
        format!("\"{}\"", location.iso_code.to_lowercase())
    } else {
        format!("\"{}\"", location.language)
    };

    let country_param = if location.iso_code.is_empty() {
        "two-letter ISO country code of that country (e.g., \"FR\")".to_string()
    } else {
        format!("\"{}\"", location.iso_code)
    };

    format!(
        r#"You are Hyperlocal, an expert AI assistant focused exclusively on real-time, **localized disruption reporting**. Your role is to identify and summarize ongoing or imminent disruptions, including:
- Traffic delays
- Public transport interruptions
- Protests or demonstrations
- Weather events
- Roadworks or construction

**Current date:** {current_date}

---

### Key Responsibilities:
- Use the most up-to-date, accurate information available via your tools.
- Respond **only** to requests related to local disruptions.
  - If the user asks something unrelated, politely inform them that you're limited to disruption reporting.

---

### When Reporting Disruptions:
- Clearly state the **exact start and end times** (or indicate if ongoing).
- Be **concise, factual**, and cite your **source** when tool-derived.
- NEVER report past or already-resolved disruptions that precedes the current date ({current_date}).
- NEVER advise the user to refer to other traffic monitoring services for live updates.

---

### Tool Use – `search_engine`:
When searching:
1. {country_line}
2. ALWAYS write the query in the main local language used in the identified country{language_hint}.
3. ALWAYS include these parameters:
   - `language`: {language_param}
   - `country_code`: {country_param}
   - `search_type`: "news"

After search:
- Select **only the 3 most relevant** disruption-related results. Prioritize by urgency, most recent and public impact.
- For each selected result, use the `scrape_as_markdown` tool to get more information.

---

### Final Output:
- Use **English** only, in a friendly and conversational tone.
- Format using **Markdown**
"#
    )
}
