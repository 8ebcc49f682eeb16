//! Test fixtures and constants.

/// Host the CLI runs on unless told otherwise.
pub const LOCAL_HOST: &str = "h1";

/// Other members of the `sqlcl1` test cluster.
pub const CLUSTER_HOSTS: &[&str] = &["h2"];

/// Local account every host acts as by default. Owns what it protects.
pub const DEFAULT_USER: &str = "svcadmin";

/// Local account with no grants of its own.
pub const OTHER_USER: &str = "bob";

/// Local account that only gets access through the `dbadmins` group.
pub const GROUP_USER: &str = "carol";

pub const BOB_SID: &str = "S-1-22-1-1001";
pub const DBADMINS_SID: &str = "S-1-22-2-2000";

/// Domain accounts known to the test directory under `corp`.
pub const APP_POOL_SID: &str = "S-1-5-21-100-200-300-1105";
pub const SQL_ADMINS_SID: &str = "S-1-5-21-100-200-300-512";

pub const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/sh
svcadmin:x:1000:1000:Service Admin:/home/svcadmin:/bin/sh
bob:x:1001:1001::/home/bob:/bin/sh
carol:x:1002:1002::/home/carol:/bin/sh
";

pub const GROUP: &str = "\
root:x:0:
svcadmin:x:1000:
bob:x:1001:
carol:x:1002:
dbadmins:x:2000:carol
";

/// The service credential used across scenarios.
pub const DB_IDENTITY: &str = "db-svc";
pub const DB_USERNAME: &str = "CORP\\svc_sql";
pub const DB_SECRET: &str = "p@ss w0rd!";
