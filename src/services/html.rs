//! Rendered pages for moderation and password-reset links. These links are
//! followed from emails by plain browsers, so outcomes are shown as small
//! static pages instead of bare status codes.

fn page(title: &str, heading: &str, text: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta name="viewport" content="width=device-width, initial-scale=1.0" charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{
            text-align: center;
            font-family: "Helvetica", sans-serif;
            background-color: #151B1E;
            color: white;
        }}
        h1 {{
            font-size: 2em;
            font-weight: bold;
        }}
    </style>
</head>
<body>
<h1>{heading}</h1>
<p>{text}</p>
</body>
</html>
"#
    )
}

pub fn event_approved() -> String {
    page(
        "Approved",
        "Event Approved",
        "The event is visible again and its reports have been cleared.",
    )
}

pub fn event_deleted() -> String {
    page("Deleted", "Event Deleted", "The event and all of its comments have been removed.")
}

pub fn comment_approved() -> String {
    page(
        "Approved",
        "Comment Approved",
        "The comment is visible again and its reports have been cleared.",
    )
}

pub fn comment_deleted() -> String {
    page("Deleted", "Comment Deleted", "The comment has been removed.")
}

pub fn reset_password_success() -> String {
    page(
        "Success",
        "Password Change Successful",
        "Go back into the app and login with your new credentials.",
    )
}

pub fn reset_password_error() -> String {
    page(
        "Error",
        "Error",
        "An error occurred. Please restart the password reset by selecting forgot password in the app.",
    )
}

pub fn action_error() -> String {
    page(
        "Error",
        "Error",
        "This link is invalid or has expired.",
    )
}

/// Interactive reset form. Posts the new password together with the freshly
/// exchanged one-time code; the original forgotPassword code is already spent
/// by the time this page is rendered.
pub fn reset_password_form(server_url: &str, code_id: &str, user_id: &str) -> String {
    let action_url = format!(
        "{}/api/users/passwordAction/resetPassword/resetPassword/{}/{}",
        server_url, code_id, user_id
    );
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta name="viewport" content="width=device-width, initial-scale=1.0" charset="UTF-8">
    <title>Reset Password</title>
    <script type="text/javascript">
        async function setNewPassword() {{
            const password = document.getElementById("password").value;
            const passwordConfirmation = document.getElementById("passwordConfirmation").value;

            const res = await fetch("{action_url}", {{
                method: "POST",
                headers: {{'Content-Type': 'application/json'}},
                body: JSON.stringify({{password: password, passwordConfirmation: passwordConfirmation}})
            }});

            if (res.status === 200) {{
                window.location.href = "{server_url}/success";
            }} else {{
                window.location.href = "{server_url}/error";
            }}
        }}
    </script>
    <style>
        body {{
            text-align: center;
            font-family: "Helvetica", sans-serif;
            background-color: #151B1E;
            color: white;
        }}
        input {{
            border-radius: 5px;
            padding: 5px 10px 8px 10px;
        }}
    </style>
</head>
<body>
<h1>Change Password</h1>
<p>
    <label for="password">New Password</label>
    <input type="password" id="password" name="password">
</p>
<p>
    <label for="passwordConfirmation">Confirm Password</label>
    <input type="password" id="passwordConfirmation" name="passwordConfirmation">
</p>
<p>
    <input type="submit" onclick="setNewPassword()" value="Change Password">
</p>
</body>
</html>
"#
    )
}
