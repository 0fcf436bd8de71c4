use clap::Parser;
use snowfall::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = args.particle_config()?;
    let background = args.background_color()?;

    let app = App::new("Snowfall", args.width, args.height, background, config)?;
    app.run()
}
