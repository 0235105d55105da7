//! Signed-in user and profile display formatting

use crate::auth::{AuthDebug, UnifiedUser};
use crate::services::ProfileView;

fn verified(flag: bool) -> &'static str {
    if flag {
        "verified"
    } else {
        "not verified"
    }
}

/// Short summary for `auth whoami`
pub fn format_user(user: &UnifiedUser) -> String {
    let mut output = String::new();

    output.push_str(&format!("Signed in as {}\n", user.label()));
    output.push_str(&format!("User ID:  {}\n", user.id));
    if let Some(email) = &user.email {
        output.push_str(&format!("Email:    {} ({})\n", email, verified(user.email_verified)));
    }
    if let Some(phone) = &user.phone_number {
        output.push_str(&format!("Phone:    {} ({})\n", phone, verified(user.phone_verified)));
    }
    output.push_str(&format!(
        "Account:  {}\n",
        if user.has_full_account() {
            "full"
        } else {
            "phone only"
        }
    ));

    output
}

pub fn format_profile(view: &ProfileView) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "[{}] {}\n",
        view.initials,
        view.display_name.as_deref().unwrap_or("(no display name)")
    ));
    output.push_str(&"-".repeat(40));
    output.push('\n');

    if let Some(bio) = &view.bio {
        output.push_str(&format!("Bio:          {}\n", bio));
    }
    if let Some(url) = &view.avatar_url {
        output.push_str(&format!("Avatar:       {}\n", url));
    }

    output.push_str(&format!(
        "Email:        {}\n",
        match &view.email {
            Some(email) => format!("{} ({})", email, verified(view.email_verified)),
            None => "-".to_string(),
        }
    ));
    output.push_str(&format!(
        "Phone:        {}\n",
        match &view.phone {
            Some(phone) => format!("{} ({})", phone, verified(view.phone_verified)),
            None => "-".to_string(),
        }
    ));
    output.push_str(&format!(
        "Member since: {}\n",
        view.member_since.format("%B %-d, %Y")
    ));

    if !view.editable {
        output.push_str(
            "\nRead-only: sign up with email to edit your profile and upload a picture.\n",
        );
    }

    output
}

pub fn format_auth_debug(debug: &AuthDebug) -> String {
    let mut output = String::new();

    output.push_str("Password session\n");
    match &debug.password_session {
        Some(s) => {
            output.push_str(&format!("  account:  {}\n", s.account_id));
            output.push_str(&format!(
                "  email:    {}\n",
                s.email.as_deref().unwrap_or("(account missing)")
            ));
            output.push_str(&format!(
                "  expires:  {}{}\n",
                s.expires_at,
                if s.expired { " (expired)" } else { "" }
            ));
        }
        None => output.push_str("  (none)\n"),
    }

    output.push_str("Phone session\n");
    match &debug.phone_session {
        Some(s) => {
            output.push_str(&format!("  uid:      {}\n", s.uid));
            output.push_str(&format!("  phone:    {}\n", s.phone_number));
            output.push_str(&format!("  since:    {}\n", s.signed_in_at));
        }
        None => output.push_str("  (none)\n"),
    }

    output.push_str("Unified user\n");
    match &debug.unified {
        Some(user) => {
            for line in format_user(user).lines() {
                output.push_str(&format!("  {}\n", line));
            }
        }
        None => output.push_str("  (signed out)\n"),
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::merge_user_data;
    use crate::models::PhoneAccount;

    #[test]
    fn test_format_phone_only_user() {
        let phone = PhoneAccount::new("+254700123456");
        let user = merge_user_data(None, Some(&phone)).unwrap();

        let output = format_user(&user);
        assert!(output.contains("Signed in as +254700123456"));
        assert!(output.contains("(verified)"));
        assert!(output.contains("phone only"));
        assert!(!output.contains("Email:"));
    }

    #[test]
    fn test_format_signed_out_debug() {
        let debug = AuthDebug {
            unified: None,
            password_session: None,
            phone_session: None,
        };
        let output = format_auth_debug(&debug);
        assert!(output.contains("(signed out)"));
        assert_eq!(output.matches("(none)").count(), 2);
    }
}
