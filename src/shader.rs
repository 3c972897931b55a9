//! Shader modules for the [`wesl::Pkg`] `wgpu_3dgs_sort`.
//!
//! See the documentation of each module for details.

use wesl::{Pkg, PkgModule};

/// The `wgpu_3dgs_sort` [`wesl::Pkg`].
pub const PACKAGE: Pkg = Pkg {
    crate_name: "wgpu_3dgs_sort",
    root: &MODULE,
    dependencies: &[],
};

/// The root module of the `wgpu_3dgs_sort` package.
pub const MODULE: PkgModule = PkgModule {
    name: "wgpu_3dgs_sort",
    source: "",
    submodules: &[
        &common::MODULE,
        &preprocess::MODULE,
        &render::MODULE,
        &sort::MODULE,
    ],
};

/// Compile a module of [`PACKAGE`] to WGSL.
///
/// `module_path` is the absolute path of the module, e.g.
/// `wgpu_3dgs_sort::sort::scatter`.
pub fn compile(module_path: &str) -> Result<String, String> {
    let mut resolver = wesl::PkgResolver::new();
    resolver.add_package(&PACKAGE);

    wesl::compile_sourcemap(
        &module_path.parse().map_err(|e| format!("{e:?}"))?,
        &resolver,
        &wesl::NoMangler,
        &wesl::CompileOptions::default(),
    )
    .map(|result| result.to_string())
    .map_err(|e| e.to_string())
}

pub mod common {
    use super::PkgModule;

    #[doc = concat!("```wgsl\n", include_str!("shader/common.wesl"), "\n```")]
    pub const MODULE: PkgModule = PkgModule {
        name: "common",
        source: include_str!("shader/common.wesl"),
        submodules: &[],
    };
}

pub mod preprocess {
    use super::PkgModule;

    #[doc = concat!("```wgsl\n", include_str!("shader/preprocess.wesl"), "\n```")]
    pub const MODULE: PkgModule = PkgModule {
        name: "preprocess",
        source: include_str!("shader/preprocess.wesl"),
        submodules: &[],
    };
}

pub mod render {
    use super::PkgModule;

    #[doc = concat!("```wgsl\n", include_str!("shader/render.wesl"), "\n```")]
    pub const MODULE: PkgModule = PkgModule {
        name: "render",
        source: include_str!("shader/render.wesl"),
        submodules: &[],
    };
}

pub mod sort {
    use super::PkgModule;

    /// The root module of the radix sort shaders.
    pub const MODULE: PkgModule = PkgModule {
        name: "sort",
        source: "",
        submodules: &[
            &control::MODULE,
            &histogram::MODULE,
            &prefix::MODULE,
            &scatter::MODULE,
        ],
    };

    pub mod control {
        use super::PkgModule;

        #[doc = concat!("```wgsl\n", include_str!("shader/sort/control.wesl"), "\n```")]
        pub const MODULE: PkgModule = PkgModule {
            name: "control",
            source: include_str!("shader/sort/control.wesl"),
            submodules: &[],
        };
    }

    pub mod histogram {
        use super::PkgModule;

        #[doc = concat!("```wgsl\n", include_str!("shader/sort/histogram.wesl"), "\n```")]
        pub const MODULE: PkgModule = PkgModule {
            name: "histogram",
            source: include_str!("shader/sort/histogram.wesl"),
            submodules: &[],
        };
    }

    pub mod prefix {
        use super::PkgModule;

        #[doc = concat!("```wgsl\n", include_str!("shader/sort/prefix.wesl"), "\n```")]
        pub const MODULE: PkgModule = PkgModule {
            name: "prefix",
            source: include_str!("shader/sort/prefix.wesl"),
            submodules: &[],
        };
    }

    pub mod scatter {
        use super::PkgModule;

        #[doc = concat!("```wgsl\n", include_str!("shader/sort/scatter.wesl"), "\n```")]
        pub const MODULE: PkgModule = PkgModule {
            name: "scatter",
            source: include_str!("shader/sort/scatter.wesl"),
            submodules: &[],
        };
    }
}
