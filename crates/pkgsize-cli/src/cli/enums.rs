use clap::ValueEnum;

/// Minifier applied to measured bundles
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum MinifierArg {
    /// Terser-compatible minification (default)
    #[value(name = "terser")]
    Terser,

    /// esbuild-compatible minification
    #[value(name = "esbuild")]
    Esbuild,
}

impl From<MinifierArg> for pkgsize_build::Minifier {
    fn from(arg: MinifierArg) -> Self {
        match arg {
            MinifierArg::Terser => pkgsize_build::Minifier::Terser,
            MinifierArg::Esbuild => pkgsize_build::Minifier::Esbuild,
        }
    }
}
