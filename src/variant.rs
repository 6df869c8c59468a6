//! Backend variants
//!
//! The three media backends share one stack shape. A [`Blueprint`] holds
//! what differs between them: logical ids, the handler module, the table
//! key and the route tree.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Entry-point function name exported by every handler module
pub const LAMBDA_HANDLER_NAME: &str = "lambda_handler";

/// Runtime of every compute unit and layer
pub const LAMBDA_RUNTIME: &str = "python3.8";

/// Asset directory holding the handler modules
pub const LAMBDA_CODE_ASSET: &str = "lambdas";

/// Table partition key attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeType {
    String,
}

/// Compute-support layer attached to the compute unit
#[derive(Debug, Clone, Copy)]
pub struct LayerBlueprint {
    pub logical_id: &'static str,
    pub code_asset: &'static str,
    pub description: Option<&'static str>,
}

/// Route tree exposed by the front door
#[derive(Debug, Clone, Copy)]
pub struct RouteShape {
    /// Path part of the collection node
    pub collection: &'static str,
    /// Path part of the item node, including braces
    pub item_segment: &'static str,
    /// Whether the item node accepts PATCH
    pub partial_update: bool,
}

/// Everything a variant needs besides concrete names
#[derive(Debug, Clone, Copy)]
pub struct Blueprint {
    pub stack_id: &'static str,
    pub bucket: &'static str,
    pub layer: Option<LayerBlueprint>,
    pub lambda: &'static str,
    /// Module that exports [`LAMBDA_HANDLER_NAME`]
    pub handler_module: &'static str,
    pub table: &'static str,
    pub partition_key: &'static str,
    pub api: &'static str,
    pub routes: RouteShape,
}

impl Blueprint {
    /// Fully-qualified handler entry point, `<module>.lambda_handler`
    pub fn handler(&self) -> String {
        format!("{}.{}", self.handler_module, LAMBDA_HANDLER_NAME)
    }
}

const IMAGE_DRIVE: Blueprint = Blueprint {
    stack_id: "ImageDriveBackStack",
    bucket: "imagesBucket",
    layer: Some(LayerBlueprint {
        logical_id: "imagesCrudLayer",
        code_asset: "lambdas/layers/global_layer",
        description: None,
    }),
    lambda: "imagesCrudLambda",
    handler_module: "images_crud_lambda",
    table: "imagesInformationTable",
    partition_key: "id",
    api: "imagesApi",
    routes: RouteShape {
        collection: "images",
        item_segment: "{image-id}",
        partial_update: true,
    },
};

const IMAGES: Blueprint = Blueprint {
    stack_id: "ImagesBackStack",
    bucket: "imagesBucket",
    layer: Some(LayerBlueprint {
        logical_id: "imagesCrudLayer",
        code_asset: "lambdas/layers/configuration-layer",
        description: None,
    }),
    lambda: "imagesCrudLambda",
    handler_module: "images_crud_lambda",
    table: "imagesInformationTable",
    partition_key: "name",
    api: "imagesApi",
    routes: RouteShape {
        collection: "images",
        item_segment: "{id}",
        partial_update: true,
    },
};

const MEMEAGES: Blueprint = Blueprint {
    stack_id: "MemeagesBackStack",
    bucket: "memesBucket",
    layer: Some(LayerBlueprint {
        logical_id: "memesCrudLambda",
        code_asset: "lambdas/layers",
        description: Some("Layer for CRUD memes Lambda containing boto3"),
    }),
    lambda: "memesCrudLambda",
    handler_module: "memes_crud_lambda",
    table: "memesInformationTable",
    partition_key: "name",
    api: "memesApi",
    routes: RouteShape {
        collection: "memes",
        item_segment: "{name}",
        partial_update: false,
    },
};

/// Media backend variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    ImageDrive,
    Images,
    Memeages,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::ImageDrive, Variant::Images, Variant::Memeages];

    pub fn blueprint(&self) -> &'static Blueprint {
        match self {
            Self::ImageDrive => &IMAGE_DRIVE,
            Self::Images => &IMAGES,
            Self::Memeages => &MEMEAGES,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImageDrive => "image-drive",
            Self::Images => "images",
            Self::Memeages => "memeages",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
