use anyhow::Result;
use env_logger::Env;
use reflectivity::output;
use reflectivity::settings;
use reflectivity::spectrum::{self, Spectrum};
use reflectivity::stack::{Stack, StackPlan};

fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = settings::load_config()?;

    let stack = Stack::design(
        settings.metal_thickness,
        settings.polymer_thickness,
        settings.spacer_thickness,
        settings.mirror_periods,
    )?;
    let plan = StackPlan::new(&stack, settings.incidence_angle)?;

    let pb = spectrum::sweep_progress(&settings.energy);
    let spectrum = Spectrum::compute_with_progress(&plan, &settings.energy, &pb)?;
    pb.finish_and_clear();

    output::writeup(&settings, &spectrum)
}
