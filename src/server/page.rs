/// Upload page served at `/`.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>OMR Answer Sheet Scanner &amp; Grading System</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; color: #222; }
        h1 { font-size: 1.6rem; }
        fieldset { border: 1px solid #dde1ea; border-radius: 8px; padding: 1rem; margin-bottom: 1rem; }
        legend { font-weight: 600; }
        button { padding: 0.6rem 1.4rem; font-size: 1rem; border-radius: 6px; border: none; background: #0f3460; color: white; cursor: pointer; }
        details { margin-bottom: 1.5rem; }
    </style>
</head>
<body>
    <h1>OMR Answer Sheet Scanner &amp; Grading System</h1>
    <details>
        <summary>Instructions</summary>
        <ul>
            <li>Upload the answer key image (JPG/PNG)</li>
            <li>Upload one or more student answer sheets</li>
            <li>Pick an output format and click &ldquo;Start Comparison&rdquo;</li>
        </ul>
    </details>
    <form action="/api/grade" method="post" enctype="multipart/form-data">
        <fieldset>
            <legend>Answer Key</legend>
            <input type="file" name="answer_key" accept=".jpg,.jpeg,.png" required>
        </fieldset>
        <fieldset>
            <legend>Student Answer Sheets</legend>
            <input type="file" name="students" accept=".jpg,.jpeg,.png" multiple required>
        </fieldset>
        <fieldset>
            <legend>Results</legend>
            <label><input type="radio" name="format" value="html" checked> View report</label>
            <label><input type="radio" name="format" value="csv"> Download CSV</label>
            <label><input type="radio" name="format" value="json"> JSON</label>
        </fieldset>
        <button type="submit">Start Comparison</button>
    </form>
</body>
</html>
"#;
