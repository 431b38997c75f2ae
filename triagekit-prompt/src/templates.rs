//! Fixed prompt texts used by the pipeline.
//!
//! Each template names its placeholders in `{{snake_case}}`; callers must
//! supply every one of them.

/// Literal the classifier model answers with when no row is affected.
pub const NO_FAILURES_TOKEN: &str = "NONE";

/// Placeholders: `bug_description`, `test_cases`.
pub const CLASSIFY_FAILURES: &str = r#"
You are a senior QA engineer who tests games and applications. A bug has been confirmed as reproducible. Decide which of the test cases below are very likely to fail because of it.

Bug description:
```
{{bug_description}}
```

Test cases (first line is the header, columns are tab separated):
```
{{test_cases}}
```

Instructions:
1. Read the bug description and its reproduction steps.
2. For every test case, decide whether its success criteria would be violated, or its described behaviour broken, by this bug.
3. Keep only test cases that fail as a direct consequence of the bug. Leave out anything unrelated or only loosely affected.

Output format:
Return only the value of the "TC No" column of each failing test case, one per line, with no other text, numbering or formatting. If no test case fails, return exactly NONE.

Example output:
TC-2
TC-73
"#;

/// Placeholders: `content`.
pub const SUMMARIZE_REPORT: &str = r#"
Write a concise, professional summary of the bug report below. Cover the core problem, what was observed and its impact.

Bug report:
{{content}}

Output rules:
- Start with the summary paragraph, then one blank line.
- If the report contains reproduction steps, add a "Steps to Reproduce:" section as a numbered list (1. ..., 2. ...), followed by "Expected results:" and "Observed results:" sections. Omit these sections when the report has no steps.
- Plain text only: no greetings, no commentary, no JSON or markdown code blocks.
"#;

/// Placeholders: `device_type`, `application_type`, `device_mode`,
/// `bug_type`, `command`, `component`, `priority`, `device_details`.
pub const DRAFT_REPORT: &str = r#"
Goal: turn the user's description of a problem into a structured bug report, returned as JSON.

Inputs:
- device type: {{device_type}}
- application type: {{application_type}}
- device mode: {{device_mode}}
- bug type: {{bug_type}}
- user description: {{command}}
- component: {{component}}
- priority: {{priority}}
- device details (copy verbatim):
{{device_details}}

Output requirements:
1. Return ONLY one JSON object that starts with { and ends with }. No markdown fences, no prose outside the object.
2. The object has exactly two string keys: "title" and "body".
3. Escape newlines and quotes inside string values (\n, \").

Title format:
[<device type>] > [<device mode>] > [<app name>] - <device name or customization id> - <concise summary of the core problem> [AppCompat]
Always name the input that triggers the problem (for example the Back key) when the description mentions one.

Body layout:
1. The title on the first line, then a blank line.
2. The device details block exactly as provided, then a blank line.
3. The sections "Steps to Reproduce:", "Expected Behavior:" and "Observed Behavior:", each with clear numbered content derived from the user description. Stay brief when the description is vague.

Example:
{"title": "[AL] > [Clamshell] > [Free Fire] - Crota360 - Content stretched on resize [AppCompat]", "body": "[AL] > [Clamshell] > [Free Fire] - Crota360 - Content stretched on resize [AppCompat]\n\n- App name: Free Fire\n- App Version: 1.2.3\n\nSteps to Reproduce:\n1. Launch the app.\n2. Resize the window.\n\nExpected Behavior:\n1. Content keeps its aspect ratio.\n\nObserved Behavior:\n1. Content is stretched."}
"#;
