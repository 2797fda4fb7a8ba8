use crate::attendance::{aggregate_totals, format_percent};
use crate::store::AttendanceStore;

pub fn render_index(store: &AttendanceStore) -> String {
    let overall = aggregate_totals(store.subjects());
    let totals = store.totals();

    let subjects = if store.subjects().is_empty() {
        r#"<p class="empty">No subjects yet. Add one to start tracking.</p>"#.to_string()
    } else {
        store
            .subjects()
            .iter()
            .map(|subject| {
                let summary = totals.get(&subject.id).copied().unwrap_or_default();
                let active = if store.active_subject_id() == Some(subject.id.as_str()) {
                    " active"
                } else {
                    ""
                };
                SUBJECT_CARD
                    .replace("{{ACTIVE}}", active)
                    .replace("{{ID}}", &escape_html(&subject.id))
                    .replace("{{NAME}}", &escape_html(&subject.name))
                    .replace(
                        "{{PERCENT}}",
                        &format_percent(summary.present, summary.total),
                    )
                    .replace("{{PRESENT}}", &summary.present.to_string())
                    .replace("{{TOTAL}}", &summary.total.to_string())
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    INDEX_HTML
        .replace("{{OVERALL_PERCENT}}", &format_percent(overall.present, overall.total))
        .replace("{{OVERALL_TOTAL}}", &overall.total.to_string())
        .replace("{{OVERALL_PRESENT}}", &overall.present.to_string())
        .replace("{{OVERALL_ABSENT}}", &overall.absent.to_string())
        .replace("{{SUBJECTS}}", &subjects)
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const SUBJECT_CARD: &str = r#"<article class="subject{{ACTIVE}}">
  <div class="subject-head">
    <h3>{{NAME}}</h3>
    <span class="percent">{{PERCENT}}</span>
  </div>
  <p class="meta">{{PRESENT}} of {{TOTAL}} attended</p>
  <div class="actions">
    <form method="post" action="/subjects/{{ID}}/present"><button class="present" type="submit">Present</button></form>
    <form method="post" action="/subjects/{{ID}}/absent"><button class="absent" type="submit">Absent</button></form>
  </div>
</article>"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Attendance Tracker</title>
  <style>
    :root {
      --bg: #f4f1ea;
      --ink: #1f2a30;
      --muted: #6d7378;
      --accent: #2e7d6b;
      --danger: #c0503a;
      --card: #ffffff;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      padding: 28px 16px 48px;
    }

    main {
      width: min(720px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    section {
      background: var(--card);
      border-radius: 18px;
      padding: 22px;
      box-shadow: 0 12px 32px rgba(31, 42, 48, 0.08);
    }

    h1 {
      margin: 0;
      font-size: 1.9rem;
    }

    h2 {
      margin: 0 0 14px;
      font-size: 1.05rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: var(--muted);
    }

    .overall {
      display: grid;
      grid-template-columns: repeat(4, 1fr);
      gap: 12px;
    }

    .overall div span {
      display: block;
    }

    .label {
      font-size: 0.8rem;
      color: var(--muted);
    }

    .value {
      font-size: 1.5rem;
      font-weight: 600;
    }

    .subject {
      border: 1px solid rgba(31, 42, 48, 0.1);
      border-radius: 14px;
      padding: 14px 16px;
      margin-bottom: 12px;
    }

    .subject.active {
      border-color: var(--accent);
    }

    .subject-head {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
    }

    .subject h3 {
      margin: 0;
    }

    .percent {
      font-weight: 600;
      color: var(--accent);
    }

    .meta,
    .empty {
      color: var(--muted);
      margin: 6px 0 10px;
    }

    .actions {
      display: flex;
      gap: 10px;
    }

    button {
      border: none;
      border-radius: 10px;
      padding: 8px 16px;
      font-weight: 600;
      color: white;
      cursor: pointer;
      background: var(--ink);
    }

    button.present {
      background: var(--accent);
    }

    button.absent {
      background: var(--danger);
    }

    .add-form {
      display: flex;
      gap: 10px;
      flex-wrap: wrap;
    }

    .add-form input {
      border: 1px solid rgba(31, 42, 48, 0.2);
      border-radius: 10px;
      padding: 8px 12px;
      font-size: 1rem;
    }

    .add-form input[name="name"] {
      flex: 1;
    }

    .add-form input[name="attendancePerClass"] {
      width: 90px;
    }
  </style>
</head>
<body>
  <main>
    <h1>Attendance Tracker</h1>

    <section>
      <h2>Overall Attendance</h2>
      <div class="overall">
        <div><span class="label">Overall</span><span class="value">{{OVERALL_PERCENT}}</span></div>
        <div><span class="label">Total classes held</span><span class="value">{{OVERALL_TOTAL}}</span></div>
        <div><span class="label">Total attended</span><span class="value">{{OVERALL_PRESENT}}</span></div>
        <div><span class="label">Total absent</span><span class="value">{{OVERALL_ABSENT}}</span></div>
      </div>
    </section>

    <section>
      <h2>Add Subject</h2>
      <form class="add-form" method="post" action="/subjects">
        <input name="name" placeholder="Subject name" required />
        <input name="attendancePerClass" type="number" min="1" max="20" value="1" />
        <button type="submit">Add</button>
      </form>
    </section>

    <section>
      <h2>Subjects</h2>
      {{SUBJECTS}}
    </section>
  </main>
</body>
</html>
"#;
