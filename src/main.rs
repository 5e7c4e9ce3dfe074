// Moim
// Main entry point

use moim::ui_egui::MoimApp;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::init();

    log::info!("Starting Moim");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Moim")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Moim",
        options,
        Box::new(|cc| {
            let app = MoimApp::new(cc)?;
            Ok(Box::new(app))
        }),
    )
}
