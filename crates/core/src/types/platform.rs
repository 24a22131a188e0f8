use crate::impl_str_enum;

/// Target platforms understood by pixi
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    NoArch,
    Unknown,
    Linux32,
    Linux64,
    LinuxAarch64,
    LinuxArmV6l,
    LinuxArmV7l,
    LinuxPpc64le,
    LinuxPpc64,
    LinuxS390X,
    LinuxRiscv32,
    LinuxRiscv64,
    Osx64,
    OsxArm64,
    Win32,
    Win64,
    WinArm64,
    EmscriptenWasm32,
    WasiWasm32,
}

impl_str_enum!(
    Platform,
    NoArch => "noarch",
    Unknown => "unknown",
    Linux32 => "linux-32",
    Linux64 => "linux-64",
    LinuxAarch64 => "linux-aarch64",
    LinuxArmV6l => "linux-armv6l",
    LinuxArmV7l => "linux-armv7l",
    LinuxPpc64le => "linux-ppc64le",
    LinuxPpc64 => "linux-ppc64",
    LinuxS390X => "linux-s390x",
    LinuxRiscv32 => "linux-riscv32",
    LinuxRiscv64 => "linux-riscv64",
    Osx64 => "osx-64",
    OsxArm64 => "osx-arm64",
    Win32 => "win-32",
    Win64 => "win-64",
    WinArm64 => "win-arm64",
    EmscriptenWasm32 => "emscripten-wasm32",
    WasiWasm32 => "wasi-wasm32",
);

/// Kind of project `pixi init` creates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProjectType {
    #[default]
    Pixi,
    Pyproject,
}

impl_str_enum!(
    ProjectType,
    Pixi => "pixi",
    Pyproject => "pyproject",
);

/// The two manifest filename conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    PixiToml,
    PyprojectToml,
}

impl ManifestKind {
    /// Preference order when a directory holds both
    pub const FILE_NAMES: [(&'static str, ManifestKind); 2] = [
        ("pixi.toml", ManifestKind::PixiToml),
        ("pyproject.toml", ManifestKind::PyprojectToml),
    ];

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::FILE_NAMES
            .iter()
            .find(|(file_name, _)| *file_name == name)
            .map(|(_, kind)| *kind)
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestKind::PixiToml => "pixi.toml",
            ManifestKind::PyprojectToml => "pyproject.toml",
        }
    }

    /// Whether manifest contents declare a pixi project.
    ///
    /// A `pyproject.toml` only counts when it carries a `[tool.pixi...]` table.
    pub fn declares_pixi(&self, contents: &str) -> bool {
        match self {
            ManifestKind::PixiToml => true,
            ManifestKind::PyprojectToml => contents
                .lines()
                .map(str::trim_start)
                .any(|line| line.starts_with("[tool.pixi")),
        }
    }
}
