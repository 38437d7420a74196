//! Implementation of the 'models' subcommand.

use faceblur_core::ModelProfile;
use faceblur_core::terminal_output;

fn target_label(profile: ModelProfile) -> &'static str {
    match profile {
        ModelProfile::FaceNano | ModelProfile::FaceMedium => "faces",
        ModelProfile::Head | ModelProfile::HeadAccurate => "heads",
        ModelProfile::Person => "people",
    }
}

/// One line per profile: identifier, weights file, target and blur style.
pub fn describe_models() -> Vec<String> {
    ModelProfile::ALL
        .iter()
        .map(|profile| {
            format!(
                "{:<24} {:<28} {:<8} {}",
                profile.identifier(),
                profile.weights_file(),
                target_label(*profile),
                profile.blur_style()
            )
        })
        .collect()
}

/// Prints the supported model identifiers.
pub fn run_models() {
    terminal_output::print_section("Models");
    for line in describe_models() {
        terminal_output::print_sub_item(&line);
    }
}
