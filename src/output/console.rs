use crate::Progress;

/// Render the status lines for one pipeline step.
pub fn render_progress(event: &Progress<'_>) -> String {
    match event {
        Progress::Saved { contract, file } => {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            format!(
                "Standard JSON Input for {} saved in {}\n",
                contract.name, file_name
            )
        }
        Progress::Verifying { .. } => {
            "trying to compile and check with generated Standard JSON Input...\n".to_string()
        }
        Progress::Verified { verification, .. } => {
            let mut output = String::new();
            output.push_str(if verification.metadata_matches {
                "\u{2713} metadata matches EXACTLY!\n"
            } else {
                "ERROR: metadata does not match\n"
            });
            output.push_str(if verification.bytecode_matches {
                "\u{2713} bytecode matches EXACTLY!\n"
            } else {
                "ERROR: bytecode does not match\n"
            });
            output
        }
        Progress::Failed { contract, error } => format!("Failed {}: {}\n", contract, error),
    }
}
