//! Fixtures shared by unit tests here and by dependent crates' tests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cloud::{CloudFields, LookupParams};
use crate::index::LookupConstraint;
use crate::model::Item;

/// Minimal image-like item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestItem {
    #[serde(default)]
    pub id: String,

    #[serde(default, rename = "root_store")]
    pub storage: String,

    #[serde(default)]
    pub virt: String,

    #[serde(flatten)]
    pub cloud: CloudFields,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Item for TestItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn cloud(&self) -> &CloudFields {
        &self.cloud
    }

    fn cloud_mut(&mut self) -> &mut CloudFields {
        &mut self.cloud
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// Constraint for `image-ids` content with explicit product ids.
#[derive(Debug, Clone)]
pub struct TestConstraint {
    pub params: LookupParams,
    pub product_ids: Vec<String>,
}

impl TestConstraint {
    pub fn new(params: LookupParams) -> Self {
        let product_ids = params
            .arches
            .iter()
            .map(|arch| format!("com.ubuntu.cloud:server:12.04:{arch}"))
            .collect();
        Self {
            params,
            product_ids,
        }
    }
}

impl LookupConstraint for TestConstraint {
    fn data_type(&self) -> &str {
        "image-ids"
    }

    fn params(&self) -> &LookupParams {
        &self.params
    }

    fn product_ids(&self) -> crate::error::StreamsResult<Vec<String>> {
        Ok(self.product_ids.clone())
    }
}

pub const INDEX_V1: &str = r#"{
 "index": {
  "com.ubuntu.cloud:released:precise": {
   "updated": "Wed, 01 May 2013 13:31:26 +0000",
   "clouds": [
    {
     "region": "us-east-1",
     "endpoint": "https://ec2.us-east-1.amazonaws.com"
    }
   ],
   "cloudname": "aws",
   "datatype": "image-ids",
   "format": "products:1.0",
   "products": [
    "com.ubuntu.cloud:server:12.04:amd64",
    "com.ubuntu.cloud:server:12.04:arm"
   ],
   "path": "streams/v1/image_metadata.json"
  },
  "com.ubuntu.cloud:released:raring": {
   "updated": "Wed, 01 May 2013 13:31:26 +0000",
   "clouds": [
    {
     "region": "us-east-1",
     "endpoint": "https://ec2.us-east-1.amazonaws.com"
    }
   ],
   "cloudname": "aws",
   "datatype": "image-ids",
   "format": "products:1.0",
   "products": [
    "com.ubuntu.cloud:server:13.04:amd64"
   ],
   "path": "streams/v1/raring_metadata.json"
  },
  "com.ubuntu.juju:released:tools": {
   "updated": "Mon, 05 Aug 2013 11:07:04 +0000",
   "datatype": "content-download",
   "format": "products:1.0",
   "products": [
    "com.ubuntu.juju:12.04:amd64",
    "com.ubuntu.juju:12.04:arm",
    "com.ubuntu.juju:13.04:amd64"
   ],
   "path": "streams/v1/tools_metadata.json"
  }
 },
 "updated": "Wed, 01 May 2013 13:31:26 +0000",
 "format": "index:1.0"
}
"#;

pub const IMAGE_METADATA_V1: &str = r#"{
 "updated": "Wed, 01 May 2013 13:31:26 +0000",
 "content_id": "com.ubuntu.cloud:released:aws",
 "datatype": "image-ids",
 "format": "products:1.0",
 "products": {
  "com.ubuntu.cloud:server:12.04:amd64": {
   "release": "precise",
   "version": "12.04",
   "arch": "amd64",
   "region": "au-east-1",
   "endpoint": "https://somewhere",
   "versions": {
    "20121218": {
     "region": "au-east-2",
     "endpoint": "https://somewhere-else",
     "items": {
      "usww1pe": {
       "root_store": "ebs",
       "virt": "pv",
       "id": "ami-26745463"
      },
      "usww2he": {
       "root_store": "ebs",
       "virt": "hvm",
       "id": "ami-442ea674",
       "region": "us-east-1",
       "endpoint": "https://ec2.us-east-1.amazonaws.com"
      },
      "usww3he": {
       "root_store": "ebs",
       "virt": "hvm",
       "crsn": "usww3",
       "id": "ami-442ea675"
      }
     },
     "pubname": "ubuntu-precise-12.04-amd64-server-20121218",
     "label": "release"
    },
    "20111111": {
     "items": {
      "usww3pe": {
       "root_store": "ebs",
       "virt": "pv",
       "id": "ami-26745464"
      },
      "usww2pe": {
       "root_store": "ebs",
       "virt": "pv",
       "id": "ami-442ea684",
       "region": "us-east-1",
       "endpoint": "https://ec2.us-east-1.amazonaws.com"
      }
     },
     "pubname": "ubuntu-precise-12.04-amd64-server-20111111",
     "label": "release"
    }
   }
  },
  "com.ubuntu.cloud:server:12.04:arm": {
   "release": "precise",
   "version": "12.04",
   "arch": "arm",
   "region": "us-east-1",
   "endpoint": "https://ec2.us-east-1.amazonaws.com",
   "versions": {
    "20121219": {
     "items": {
      "usee2pe": {
       "root_store": "ebs",
       "virt": "pv",
       "id": "ami-442ea699"
      }
     },
     "pubname": "ubuntu-precise-12.04-arm-server-20121219",
     "label": "release"
    }
   }
  }
 },
 "_aliases": {
  "crsn": {
   "usww3": {
    "region": "us-west-3",
    "endpoint": "https://ec2.us-west-3.amazonaws.com"
   }
  }
 }
}
"#;
