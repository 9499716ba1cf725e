// Three route tiers:
//   public    - /auth/*        no session required
//   protected - /api/orders    session required
//   admin     - /api/admin/*, /api/send-emails   session + admin flag
pub mod admin;
pub mod protected;
pub mod public;
